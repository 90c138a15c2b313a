//! Per-entity column layouts, cell rendering and form parsing.

use std::marker::PhantomData;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::Entity;
use crate::error::Result;
use crate::models::{
    Appointment, AppointmentDraft, Bill, BillDraft, Doctor, DoctorDraft, InventoryDraft,
    InventoryItem, Patient, PatientDraft, Prescription, PrescriptionDraft,
};

use super::{reference_cell, Column, EntityTable, FieldCheck, RecordForm, Row};

/// A record type that can be shown as a row of strings and rebuilt from a
/// filled-in [`RecordForm`].
pub trait Tabular: Entity + 'static {
    const TITLE: &'static str;
    const COLUMNS: &'static [Column];

    /// One cell per entry in `COLUMNS`.
    fn cells(&self) -> Vec<String>;

    fn parse_form(form: &RecordForm, today: NaiveDate) -> Result<Self::Draft>;
}

/// Adapts a [`Tabular`] record type to the object-safe [`EntityTable`].
pub struct TableOf<E>(PhantomData<fn() -> E>);

impl<E> TableOf<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for TableOf<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Tabular> EntityTable for TableOf<E> {
    fn title(&self) -> &'static str {
        E::TITLE
    }

    fn entity_name(&self) -> &'static str {
        E::NAME
    }

    fn columns(&self) -> &'static [Column] {
        E::COLUMNS
    }

    fn list(&self, conn: &Connection) -> Result<Vec<Row>> {
        Ok(E::list(conn)?
            .iter()
            .map(|record| Row {
                id: record.id(),
                cells: record.cells(),
            })
            .collect())
    }

    fn insert(&self, conn: &Connection, form: &RecordForm, today: NaiveDate) -> Result<i64> {
        let draft = E::parse_form(form, today)?;
        E::insert(conn, &draft)
    }

    fn update(
        &self,
        conn: &Connection,
        id: i64,
        form: &RecordForm,
        today: NaiveDate,
    ) -> Result<()> {
        let draft = E::parse_form(form, today)?;
        E::update(conn, id, &draft)
    }

    fn delete(&self, conn: &Connection, id: i64) -> Result<bool> {
        E::delete(conn, id)
    }
}

/// The six entity tables in tab order.
pub fn clinic_tables() -> Vec<Box<dyn EntityTable>> {
    vec![
        Box::new(TableOf::<Doctor>::new()),
        Box::new(TableOf::<Patient>::new()),
        Box::new(TableOf::<InventoryItem>::new()),
        Box::new(TableOf::<Prescription>::new()),
        Box::new(TableOf::<Bill>::new()),
        Box::new(TableOf::<Appointment>::new()),
    ]
}

impl Tabular for Doctor {
    const TITLE: &'static str = "Doctors";
    const COLUMNS: &'static [Column] = &[
        Column::identifier("id", "ID"),
        Column::editable("vcn", "VCN"),
        Column::editable("name", "Name"),
        Column::editable("phone", "Phone"),
        Column::editable("email", "Email"),
        Column::editable("graduated_year", "Graduated Year"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.license_code.clone(),
            self.name.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.graduation_year.to_string(),
        ]
    }

    fn parse_form(form: &RecordForm, _today: NaiveDate) -> Result<DoctorDraft> {
        let mut check = FieldCheck::new();
        let graduation_year = check.integer("Graduated Year", form.get("graduated_year"));
        check.finish()?;

        Ok(DoctorDraft {
            license_code: form.get("vcn").to_string(),
            name: form.get("name").to_string(),
            phone: form.get("phone").to_string(),
            email: form.get("email").to_string(),
            graduation_year,
        })
    }
}

impl Tabular for Patient {
    const TITLE: &'static str = "Patients";
    const COLUMNS: &'static [Column] = &[
        Column::identifier("id", "ID"),
        Column::editable("name", "Name"),
        Column::editable("species", "Species"),
        Column::editable("breed", "Breed"),
        Column::editable("owner_name", "Owner Name"),
        Column::editable("owner_contact", "Owner Contact"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.species.clone(),
            self.breed.clone(),
            self.owner_name.clone(),
            self.owner_contact.clone(),
        ]
    }

    fn parse_form(form: &RecordForm, _today: NaiveDate) -> Result<PatientDraft> {
        Ok(PatientDraft {
            name: form.get("name").to_string(),
            species: form.get("species").to_string(),
            breed: form.get("breed").to_string(),
            owner_name: form.get("owner_name").to_string(),
            owner_contact: form.get("owner_contact").to_string(),
        })
    }
}

impl Tabular for InventoryItem {
    const TITLE: &'static str = "Inventory";
    const COLUMNS: &'static [Column] = &[
        Column::identifier("id", "ID"),
        Column::editable("item_name", "Item Name"),
        Column::editable("description", "Description"),
        Column::editable("quantity", "Quantity"),
        Column::editable("unit_price", "Unit Price"),
        Column::editable("expiry_date", "Expiry Date"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone(),
            self.quantity.to_string(),
            self.unit_price.to_string(),
            self.expiry_date.clone(),
        ]
    }

    fn parse_form(form: &RecordForm, _today: NaiveDate) -> Result<InventoryDraft> {
        let mut check = FieldCheck::new();
        let quantity = check.count("Quantity", form.get("quantity"));
        let unit_price = check.price("Unit Price", form.get("unit_price"));
        let expiry_date = check.date("Expiry Date", form.get("expiry_date"));
        check.finish()?;

        Ok(InventoryDraft {
            name: form.get("item_name").to_string(),
            description: form.get("description").to_string(),
            quantity,
            unit_price,
            expiry_date,
        })
    }
}

impl Tabular for Prescription {
    const TITLE: &'static str = "Prescriptions";
    const COLUMNS: &'static [Column] = &[
        Column::identifier("id", "ID"),
        Column::editable("patient", "Patient"),
        Column::editable("doctor", "Doctor"),
        Column::editable("date", "Date"),
        Column::editable("diagnosis", "Diagnosis"),
        Column::editable("medication", "Medication"),
        Column::editable("dosage", "Dosage"),
        Column::editable("instructions", "Instructions"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            reference_cell(self.patient_id, &self.patient_name),
            reference_cell(self.doctor_id, &self.doctor_name),
            self.date.clone(),
            self.diagnosis.clone(),
            self.medication.clone(),
            self.dosage.clone(),
            self.instructions.clone(),
        ]
    }

    fn parse_form(form: &RecordForm, today: NaiveDate) -> Result<PrescriptionDraft> {
        let mut check = FieldCheck::new();
        let patient_id = check.reference("Patient", form.get("patient"));
        let doctor_id = check.reference("Doctor", form.get("doctor"));
        let date = check.date_or("Date", form.get("date"), today);
        check.finish()?;

        Ok(PrescriptionDraft {
            patient_id,
            doctor_id,
            date,
            diagnosis: form.get("diagnosis").to_string(),
            medication: form.get("medication").to_string(),
            dosage: form.get("dosage").to_string(),
            instructions: form.get("instructions").to_string(),
        })
    }
}

impl Tabular for Bill {
    const TITLE: &'static str = "Billing";
    const COLUMNS: &'static [Column] = &[
        Column::identifier("id", "ID"),
        Column::editable("prescription_id", "Prescription ID"),
        Column::derived("patient", "Patient"),
        Column::editable("total_amount", "Total"),
        Column::editable("paid_amount", "Paid"),
        Column::editable("billing_date", "Billing Date"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.prescription_id.to_string(),
            self.patient_name.clone(),
            self.total_amount.to_string(),
            self.paid_amount.to_string(),
            self.billing_date.clone(),
        ]
    }

    fn parse_form(form: &RecordForm, today: NaiveDate) -> Result<BillDraft> {
        let mut check = FieldCheck::new();
        let prescription_id = check.reference("Prescription ID", form.get("prescription_id"));
        let total_amount = check.decimal("Total", form.get("total_amount"));
        let paid_amount = check.decimal("Paid", form.get("paid_amount"));
        let billing_date = check.date_or("Billing Date", form.get("billing_date"), today);
        check.finish()?;

        Ok(BillDraft {
            prescription_id,
            total_amount,
            paid_amount,
            billing_date,
        })
    }
}

impl Tabular for Appointment {
    const TITLE: &'static str = "Appointments";
    const COLUMNS: &'static [Column] = &[
        Column::identifier("id", "ID"),
        Column::editable("patient", "Patient"),
        Column::editable("doctor", "Doctor"),
        Column::editable("date", "Date"),
        Column::editable("time", "Time"),
        Column::editable("reason", "Reason"),
        Column::editable("status", "Status"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            reference_cell(self.patient_id, &self.patient_name),
            reference_cell(self.doctor_id, &self.doctor_name),
            self.date.clone(),
            self.time.clone(),
            self.reason.clone(),
            self.status.clone(),
        ]
    }

    fn parse_form(form: &RecordForm, _today: NaiveDate) -> Result<AppointmentDraft> {
        let mut check = FieldCheck::new();
        let patient_id = check.reference("Patient", form.get("patient"));
        let doctor_id = check.reference("Doctor", form.get("doctor"));
        let date = check.date("Date", form.get("date"));
        let time = check.time("Time", form.get("time"));
        let status = check.status("Status", form.get("status"));
        check.finish()?;

        Ok(AppointmentDraft {
            patient_id,
            doctor_id,
            date,
            time,
            reason: form.get("reason").to_string(),
            status,
        })
    }
}
