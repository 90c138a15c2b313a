use rusqlite::Connection;

use crate::error::Result;
use crate::models::{
    Appointment, AppointmentDraft, Bill, BillDraft, Doctor, DoctorDraft, InventoryDraft,
    InventoryItem, Patient, PatientDraft, Prescription, PrescriptionDraft,
};

use super::{appointments, billing, doctors, inventory, patients, prescriptions};

/// The capability set every entity exposes over the store. Implemented once
/// per record type by delegating to that entity's query functions.
pub trait Entity: Sized {
    /// Validated field set accepted by `insert` and `update`.
    type Draft;

    /// Singular display name, used in messages.
    const NAME: &'static str;

    fn id(&self) -> i64;

    fn list(conn: &Connection) -> Result<Vec<Self>>;

    /// Insert a row and return its new primary key.
    fn insert(conn: &Connection, draft: &Self::Draft) -> Result<i64>;

    fn update(conn: &Connection, id: i64, draft: &Self::Draft) -> Result<()>;

    /// Returns whether a row was removed. Absent ids are not an error.
    fn delete(conn: &Connection, id: i64) -> Result<bool>;
}

impl Entity for Doctor {
    type Draft = DoctorDraft;
    const NAME: &'static str = "Doctor";

    fn id(&self) -> i64 {
        self.id
    }

    fn list(conn: &Connection) -> Result<Vec<Self>> {
        doctors::fetch_doctors(conn)
    }

    fn insert(conn: &Connection, draft: &DoctorDraft) -> Result<i64> {
        doctors::create_doctor(conn, draft).map(|doctor| doctor.id)
    }

    fn update(conn: &Connection, id: i64, draft: &DoctorDraft) -> Result<()> {
        doctors::update_doctor(conn, id, draft)
    }

    fn delete(conn: &Connection, id: i64) -> Result<bool> {
        doctors::delete_doctor(conn, id)
    }
}

impl Entity for Patient {
    type Draft = PatientDraft;
    const NAME: &'static str = "Patient";

    fn id(&self) -> i64 {
        self.id
    }

    fn list(conn: &Connection) -> Result<Vec<Self>> {
        patients::fetch_patients(conn)
    }

    fn insert(conn: &Connection, draft: &PatientDraft) -> Result<i64> {
        patients::create_patient(conn, draft).map(|patient| patient.id)
    }

    fn update(conn: &Connection, id: i64, draft: &PatientDraft) -> Result<()> {
        patients::update_patient(conn, id, draft)
    }

    fn delete(conn: &Connection, id: i64) -> Result<bool> {
        patients::delete_patient(conn, id)
    }
}

impl Entity for InventoryItem {
    type Draft = InventoryDraft;
    const NAME: &'static str = "Inventory item";

    fn id(&self) -> i64 {
        self.id
    }

    fn list(conn: &Connection) -> Result<Vec<Self>> {
        inventory::fetch_items(conn)
    }

    fn insert(conn: &Connection, draft: &InventoryDraft) -> Result<i64> {
        inventory::create_item(conn, draft).map(|item| item.id)
    }

    fn update(conn: &Connection, id: i64, draft: &InventoryDraft) -> Result<()> {
        inventory::update_item(conn, id, draft)
    }

    fn delete(conn: &Connection, id: i64) -> Result<bool> {
        inventory::delete_item(conn, id)
    }
}

impl Entity for Prescription {
    type Draft = PrescriptionDraft;
    const NAME: &'static str = "Prescription";

    fn id(&self) -> i64 {
        self.id
    }

    fn list(conn: &Connection) -> Result<Vec<Self>> {
        prescriptions::fetch_prescriptions(conn)
    }

    fn insert(conn: &Connection, draft: &PrescriptionDraft) -> Result<i64> {
        prescriptions::create_prescription(conn, draft)
    }

    fn update(conn: &Connection, id: i64, draft: &PrescriptionDraft) -> Result<()> {
        prescriptions::update_prescription(conn, id, draft)
    }

    fn delete(conn: &Connection, id: i64) -> Result<bool> {
        prescriptions::delete_prescription(conn, id)
    }
}

impl Entity for Bill {
    type Draft = BillDraft;
    const NAME: &'static str = "Bill";

    fn id(&self) -> i64 {
        self.id
    }

    fn list(conn: &Connection) -> Result<Vec<Self>> {
        billing::fetch_bills(conn)
    }

    fn insert(conn: &Connection, draft: &BillDraft) -> Result<i64> {
        billing::create_bill(conn, draft)
    }

    fn update(conn: &Connection, id: i64, draft: &BillDraft) -> Result<()> {
        billing::update_bill(conn, id, draft)
    }

    fn delete(conn: &Connection, id: i64) -> Result<bool> {
        billing::delete_bill(conn, id)
    }
}

impl Entity for Appointment {
    type Draft = AppointmentDraft;
    const NAME: &'static str = "Appointment";

    fn id(&self) -> i64 {
        self.id
    }

    fn list(conn: &Connection) -> Result<Vec<Self>> {
        appointments::fetch_appointments(conn)
    }

    fn insert(conn: &Connection, draft: &AppointmentDraft) -> Result<i64> {
        appointments::create_appointment(conn, draft)
    }

    fn update(conn: &Connection, id: i64, draft: &AppointmentDraft) -> Result<()> {
        appointments::update_appointment(conn, id, draft)
    }

    fn delete(conn: &Connection, id: i64) -> Result<bool> {
        appointments::delete_appointment(conn, id)
    }
}
