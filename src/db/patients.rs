use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::error::{ClinicError, Result, StoreContext};
use crate::models::{Choice, Patient, PatientDraft};

pub fn fetch_patients(conn: &Connection) -> Result<Vec<Patient>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, species, breed, owner_name, owner_contact
             FROM patients
             ORDER BY id",
        )
        .context("failed to prepare patient query")?;

    let patients = stmt
        .query_map([], |row| {
            Ok(Patient {
                id: row.get(0)?,
                name: row.get(1)?,
                species: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                breed: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                owner_name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                owner_contact: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            })
        })
        .context("failed to load patients")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect patients")?;

    Ok(patients)
}

pub fn list_patient_choices(conn: &Connection) -> Result<Vec<Choice>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM patients ORDER BY name COLLATE NOCASE, id")
        .context("failed to prepare patient choices query")?;

    let choices = stmt
        .query_map([], |row| {
            Ok(Choice {
                id: row.get(0)?,
                label: row.get(1)?,
            })
        })
        .context("failed to load patient choices")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect patient choices")?;

    Ok(choices)
}

pub fn create_patient(conn: &Connection, draft: &PatientDraft) -> Result<Patient> {
    conn.execute(
        "INSERT INTO patients (name, species, breed, owner_name, owner_contact)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.name,
            draft.species,
            draft.breed,
            draft.owner_name,
            draft.owner_contact
        ],
    )
    .context("failed to insert patient")?;

    let id = conn.last_insert_rowid();
    info!(id, "patient added");
    Ok(Patient {
        id,
        name: draft.name.clone(),
        species: draft.species.clone(),
        breed: draft.breed.clone(),
        owner_name: draft.owner_name.clone(),
        owner_contact: draft.owner_contact.clone(),
    })
}

pub fn update_patient(conn: &Connection, id: i64, draft: &PatientDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE patients
             SET name = ?1, species = ?2, breed = ?3, owner_name = ?4, owner_contact = ?5
             WHERE id = ?6",
            params![
                draft.name,
                draft.species,
                draft.breed,
                draft.owner_name,
                draft.owner_contact,
                id
            ],
        )
        .context("failed to update patient")?;

    if updated == 0 {
        return Err(ClinicError::NotFound {
            entity: "Patient",
            id,
        });
    }
    info!(id, "patient updated");
    Ok(())
}

pub fn delete_patient(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM patients WHERE id = ?1", params![id])
        .context("failed to delete patient")?;

    if deleted == 0 {
        warn!(id, "no patient to delete");
    } else {
        info!(id, "patient deleted");
    }
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn draft(name: &str, species: &str) -> PatientDraft {
        PatientDraft {
            name: name.into(),
            species: species.into(),
            breed: "Mixed".into(),
            owner_name: "Sam Park".into(),
            owner_contact: "(555) 300-1000".into(),
        }
    }

    #[test]
    fn update_changes_only_the_targeted_row() {
        let conn = open_in_memory().unwrap();
        let rex = create_patient(&conn, &draft("Rex", "Dog")).unwrap();
        let milo = create_patient(&conn, &draft("Milo", "Cat")).unwrap();

        let mut changed = draft("Rex", "Dog");
        changed.breed = "Beagle".into();
        update_patient(&conn, rex.id, &changed).unwrap();

        let patients = fetch_patients(&conn).unwrap();
        assert_eq!(patients[0].breed, "Beagle");
        assert_eq!(patients[0].name, "Rex");
        assert_eq!(patients[0].owner_contact, rex.owner_contact);
        assert_eq!(patients[1], milo);
    }

    #[test]
    fn deleting_absent_patient_leaves_others() {
        let conn = open_in_memory().unwrap();
        create_patient(&conn, &draft("Rex", "Dog")).unwrap();
        assert!(!delete_patient(&conn, 999).unwrap());
        assert_eq!(fetch_patients(&conn).unwrap().len(), 1);
    }
}
