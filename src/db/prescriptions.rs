use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::error::{ClinicError, Result, StoreContext};
use crate::models::{Choice, Prescription, PrescriptionDraft, DATE_FORMAT};

/// Newest first. Names come from `LEFT JOIN`s so prescriptions whose patient
/// or doctor has been deleted still show up (with a blank name).
pub fn fetch_prescriptions(conn: &Connection) -> Result<Vec<Prescription>> {
    let mut stmt = conn
        .prepare(
            "SELECT p.id, p.patient_id, COALESCE(pt.name, ''), p.doctor_id, COALESCE(d.name, ''),
                    p.date, p.diagnosis, p.medication, p.dosage, p.instructions
             FROM prescriptions p
             LEFT JOIN patients pt ON p.patient_id = pt.id
             LEFT JOIN doctors d ON p.doctor_id = d.id
             ORDER BY p.id DESC",
        )
        .context("failed to prepare prescription query")?;

    let prescriptions = stmt
        .query_map([], |row| {
            Ok(Prescription {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                patient_name: row.get(2)?,
                doctor_id: row.get(3)?,
                doctor_name: row.get(4)?,
                date: row.get(5)?,
                diagnosis: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                medication: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                dosage: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                instructions: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            })
        })
        .context("failed to load prescriptions")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect prescriptions")?;

    Ok(prescriptions)
}

/// `Patient - Medication (date)` labels, newest first, for the billing prompt.
pub fn list_prescription_choices(conn: &Connection) -> Result<Vec<Choice>> {
    let mut stmt = conn
        .prepare(
            "SELECT p.id, COALESCE(pt.name, '?'), COALESCE(p.medication, ''), p.date
             FROM prescriptions p
             LEFT JOIN patients pt ON p.patient_id = pt.id
             ORDER BY p.id DESC",
        )
        .context("failed to prepare prescription choices query")?;

    let choices = stmt
        .query_map([], |row| {
            let patient: String = row.get(1)?;
            let medication: String = row.get(2)?;
            let date: String = row.get(3)?;
            Ok(Choice {
                id: row.get(0)?,
                label: format!("{patient} - {medication} ({date})"),
            })
        })
        .context("failed to load prescription choices")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect prescription choices")?;

    Ok(choices)
}

pub fn create_prescription(conn: &Connection, draft: &PrescriptionDraft) -> Result<i64> {
    conn.execute(
        "INSERT INTO prescriptions
             (patient_id, doctor_id, date, diagnosis, medication, dosage, instructions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            draft.patient_id,
            draft.doctor_id,
            draft.date.format(DATE_FORMAT).to_string(),
            draft.diagnosis,
            draft.medication,
            draft.dosage,
            draft.instructions
        ],
    )
    .context("failed to insert prescription")?;

    let id = conn.last_insert_rowid();
    info!(id, patient = draft.patient_id, doctor = draft.doctor_id, "prescription added");
    Ok(id)
}

pub fn update_prescription(conn: &Connection, id: i64, draft: &PrescriptionDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE prescriptions
             SET patient_id = ?1, doctor_id = ?2, date = ?3, diagnosis = ?4,
                 medication = ?5, dosage = ?6, instructions = ?7
             WHERE id = ?8",
            params![
                draft.patient_id,
                draft.doctor_id,
                draft.date.format(DATE_FORMAT).to_string(),
                draft.diagnosis,
                draft.medication,
                draft.dosage,
                draft.instructions,
                id
            ],
        )
        .context("failed to update prescription")?;

    if updated == 0 {
        return Err(ClinicError::NotFound {
            entity: "Prescription",
            id,
        });
    }
    info!(id, "prescription updated");
    Ok(())
}

/// Bills that reference the prescription are kept.
pub fn delete_prescription(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM prescriptions WHERE id = ?1", params![id])
        .context("failed to delete prescription")?;

    if deleted == 0 {
        warn!(id, "no prescription to delete");
    } else {
        info!(id, "prescription deleted");
    }
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::{create_doctor, create_patient, delete_doctor, open_in_memory};
    use crate::models::{DoctorDraft, PatientDraft};

    #[test]
    fn deleting_a_doctor_orphans_but_keeps_prescriptions() {
        let conn = open_in_memory().unwrap();
        let patient = create_patient(
            &conn,
            &PatientDraft {
                name: "Luna".into(),
                species: "Cat".into(),
                breed: "Siamese".into(),
                owner_name: "Kim".into(),
                owner_contact: "555".into(),
            },
        )
        .unwrap();
        let doctor = create_doctor(
            &conn,
            &DoctorDraft {
                license_code: "VCN777777".into(),
                name: "Dr. Vale".into(),
                phone: String::new(),
                email: String::new(),
                graduation_year: 2001,
            },
        )
        .unwrap();
        create_prescription(
            &conn,
            &PrescriptionDraft {
                patient_id: patient.id,
                doctor_id: doctor.id,
                date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                diagnosis: "Arthritis".into(),
                medication: "Rimadyl 75mg".into(),
                dosage: "1 tablet daily".into(),
                instructions: "Give with food".into(),
            },
        )
        .unwrap();

        let listed = fetch_prescriptions(&conn).unwrap();
        assert_eq!(listed[0].doctor_name, "Dr. Vale");

        assert!(delete_doctor(&conn, doctor.id).unwrap());
        let listed = fetch_prescriptions(&conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].doctor_id, doctor.id);
        assert_eq!(listed[0].doctor_name, "");
        assert_eq!(listed[0].patient_name, "Luna");

        let choices = list_prescription_choices(&conn).unwrap();
        assert_eq!(choices[0].label, "Luna - Rimadyl 75mg (2026-09-01)");
    }
}
