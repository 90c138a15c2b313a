//! Persistence module split across one submodule per table. Every function
//! takes the store handle explicitly and runs a single statement.

mod appointments;
mod billing;
mod connection;
mod doctors;
mod entity;
mod inventory;
mod patients;
mod prescriptions;

pub use appointments::{
    create_appointment, delete_appointment, fetch_appointments, update_appointment,
};
pub use billing::{create_bill, delete_bill, fetch_bills, update_bill, update_bill_payment};
pub use connection::{
    count_rows, ensure_schema, open_in_memory, open_store, reset_schema, TABLES,
};
pub use doctors::{create_doctor, delete_doctor, fetch_doctors, list_doctor_choices, update_doctor};
pub use entity::Entity;
pub use inventory::{create_item, delete_item, fetch_items, update_item};
pub use patients::{
    create_patient, delete_patient, fetch_patients, list_patient_choices, update_patient,
};
pub use prescriptions::{
    create_prescription, delete_prescription, fetch_prescriptions, list_prescription_choices,
    update_prescription,
};
