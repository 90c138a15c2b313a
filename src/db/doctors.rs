use rusqlite::{ffi, params, Connection, Error as SqlError, ErrorCode};
use tracing::{info, warn};

use crate::error::{ClinicError, Result, StoreContext};
use crate::models::{Choice, Doctor, DoctorDraft};

/// Every doctor ordered by primary key.
pub fn fetch_doctors(conn: &Connection) -> Result<Vec<Doctor>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, vcn, name, phone, email, graduated_year
             FROM doctors
             ORDER BY id",
        )
        .context("failed to prepare doctor query")?;

    let doctors = stmt
        .query_map([], |row| {
            Ok(Doctor {
                id: row.get(0)?,
                license_code: row.get(1)?,
                name: row.get(2)?,
                phone: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                email: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                graduation_year: row.get::<_, Option<i64>>(5)?.unwrap_or_default(),
            })
        })
        .context("failed to load doctors")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect doctors")?;

    Ok(doctors)
}

/// Id/name pairs ordered by name, for reference prompts.
pub fn list_doctor_choices(conn: &Connection) -> Result<Vec<Choice>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM doctors ORDER BY name COLLATE NOCASE, id")
        .context("failed to prepare doctor choices query")?;

    let choices = stmt
        .query_map([], |row| {
            Ok(Choice {
                id: row.get(0)?,
                label: row.get(1)?,
            })
        })
        .context("failed to load doctor choices")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect doctor choices")?;

    Ok(choices)
}

/// Insert a doctor, returning the hydrated record. A license code that is
/// already taken surfaces as [`ClinicError::DuplicateLicense`] and nothing is
/// written.
pub fn create_doctor(conn: &Connection, draft: &DoctorDraft) -> Result<Doctor> {
    conn.execute(
        "INSERT INTO doctors (vcn, name, phone, email, graduated_year)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.license_code,
            draft.name,
            draft.phone,
            draft.email,
            draft.graduation_year
        ],
    )
    .map_err(|err| map_unique_constraint(err, &draft.license_code, "failed to insert doctor"))?;

    let id = conn.last_insert_rowid();
    info!(id, license = %draft.license_code, "doctor added");
    Ok(Doctor {
        id,
        license_code: draft.license_code.clone(),
        name: draft.name.clone(),
        phone: draft.phone.clone(),
        email: draft.email.clone(),
        graduation_year: draft.graduation_year,
    })
}

pub fn update_doctor(conn: &Connection, id: i64, draft: &DoctorDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE doctors
             SET vcn = ?1, name = ?2, phone = ?3, email = ?4, graduated_year = ?5
             WHERE id = ?6",
            params![
                draft.license_code,
                draft.name,
                draft.phone,
                draft.email,
                draft.graduation_year,
                id
            ],
        )
        .map_err(|err| {
            map_unique_constraint(err, &draft.license_code, "failed to update doctor")
        })?;

    if updated == 0 {
        return Err(ClinicError::NotFound {
            entity: "Doctor",
            id,
        });
    }
    info!(id, "doctor updated");
    Ok(())
}

/// Remove a doctor. Prescriptions and appointments that point at it are left
/// in place.
pub fn delete_doctor(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM doctors WHERE id = ?1", params![id])
        .context("failed to delete doctor")?;

    if deleted == 0 {
        warn!(id, "no doctor to delete");
    } else {
        info!(id, "doctor deleted");
    }
    Ok(deleted > 0)
}

/// The only uniqueness constraint in the schema is `doctors.vcn`; any other
/// failure passes through as a store error.
fn map_unique_constraint(err: SqlError, license_code: &str, action: &'static str) -> ClinicError {
    let is_unique = matches!(
        err.sqlite_error(),
        Some(inner) if inner.code == ErrorCode::ConstraintViolation
            && inner.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    );
    if is_unique {
        ClinicError::DuplicateLicense(license_code.to_string())
    } else {
        ClinicError::Store {
            action,
            source: err,
        }
    }
}
