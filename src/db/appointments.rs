use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::error::{ClinicError, Result, StoreContext};
use crate::models::{Appointment, AppointmentDraft, DATE_FORMAT, TIME_FORMAT};

/// Latest first by date then time.
pub fn fetch_appointments(conn: &Connection) -> Result<Vec<Appointment>> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.patient_id, COALESCE(pt.name, ''), a.doctor_id, COALESCE(d.name, ''),
                    a.date, a.time, a.reason, a.status
             FROM appointments a
             LEFT JOIN patients pt ON a.patient_id = pt.id
             LEFT JOIN doctors d ON a.doctor_id = d.id
             ORDER BY a.date DESC, a.time DESC, a.id DESC",
        )
        .context("failed to prepare appointment query")?;

    let appointments = stmt
        .query_map([], |row| {
            Ok(Appointment {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                patient_name: row.get(2)?,
                doctor_id: row.get(3)?,
                doctor_name: row.get(4)?,
                date: row.get(5)?,
                time: row.get(6)?,
                reason: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                status: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            })
        })
        .context("failed to load appointments")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect appointments")?;

    Ok(appointments)
}

pub fn create_appointment(conn: &Connection, draft: &AppointmentDraft) -> Result<i64> {
    conn.execute(
        "INSERT INTO appointments (patient_id, doctor_id, date, time, reason, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            draft.patient_id,
            draft.doctor_id,
            draft.date.format(DATE_FORMAT).to_string(),
            draft.time.format(TIME_FORMAT).to_string(),
            draft.reason,
            draft.status.as_str()
        ],
    )
    .context("failed to insert appointment")?;

    let id = conn.last_insert_rowid();
    info!(id, status = %draft.status, "appointment added");
    Ok(id)
}

pub fn update_appointment(conn: &Connection, id: i64, draft: &AppointmentDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE appointments
             SET patient_id = ?1, doctor_id = ?2, date = ?3, time = ?4, reason = ?5, status = ?6
             WHERE id = ?7",
            params![
                draft.patient_id,
                draft.doctor_id,
                draft.date.format(DATE_FORMAT).to_string(),
                draft.time.format(TIME_FORMAT).to_string(),
                draft.reason,
                draft.status.as_str(),
                id
            ],
        )
        .context("failed to update appointment")?;

    if updated == 0 {
        return Err(ClinicError::NotFound {
            entity: "Appointment",
            id,
        });
    }
    info!(id, status = %draft.status, "appointment updated");
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM appointments WHERE id = ?1", params![id])
        .context("failed to delete appointment")?;

    if deleted == 0 {
        warn!(id, "no appointment to delete");
    } else {
        info!(id, "appointment deleted");
    }
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::db::open_in_memory;
    use crate::models::AppointmentStatus;

    fn draft(date: (i32, u32, u32), time: (u32, u32)) -> AppointmentDraft {
        AppointmentDraft {
            patient_id: 1,
            doctor_id: 1,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            reason: "Checkup".into(),
            status: AppointmentStatus::Scheduled,
        }
    }

    #[test]
    fn appointments_list_latest_first() {
        let conn = open_in_memory().unwrap();
        create_appointment(&conn, &draft((2026, 10, 1), (9, 0))).unwrap();
        create_appointment(&conn, &draft((2026, 10, 2), (8, 0))).unwrap();
        create_appointment(&conn, &draft((2026, 10, 2), (15, 45))).unwrap();

        let slots: Vec<(String, String)> = fetch_appointments(&conn)
            .unwrap()
            .into_iter()
            .map(|a| (a.date, a.time))
            .collect();
        assert_eq!(
            slots,
            vec![
                ("2026-10-02".to_string(), "15:45".to_string()),
                ("2026-10-02".to_string(), "08:00".to_string()),
                ("2026-10-01".to_string(), "09:00".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_stored_status_is_listed_verbatim() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO appointments (patient_id, doctor_id, date, time, reason, status)
             VALUES (1, 1, '2026-01-01', '10:00', 'Imported', 'Postponed')",
            [],
        )
        .unwrap();
        let listed = fetch_appointments(&conn).unwrap();
        assert_eq!(listed[0].status, "Postponed");
        assert_eq!(listed[0].parsed_status(), None);
    }
}
