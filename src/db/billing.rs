use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::error::{ClinicError, Result, StoreContext};
use crate::models::{Bill, BillDraft, DATE_FORMAT};

/// Newest first, patient name resolved through the prescription.
pub fn fetch_bills(conn: &Connection) -> Result<Vec<Bill>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.id, b.prescription_id, COALESCE(pt.name, ''), b.total_amount,
                    b.paid_amount, b.billing_date
             FROM billing b
             LEFT JOIN prescriptions p ON b.prescription_id = p.id
             LEFT JOIN patients pt ON p.patient_id = pt.id
             ORDER BY b.id DESC",
        )
        .context("failed to prepare billing query")?;

    let bills = stmt
        .query_map([], |row| {
            Ok(Bill {
                id: row.get(0)?,
                prescription_id: row.get(1)?,
                patient_name: row.get(2)?,
                total_amount: row.get(3)?,
                paid_amount: row.get(4)?,
                billing_date: row.get(5)?,
            })
        })
        .context("failed to load bills")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect bills")?;

    Ok(bills)
}

pub fn create_bill(conn: &Connection, draft: &BillDraft) -> Result<i64> {
    conn.execute(
        "INSERT INTO billing (prescription_id, total_amount, paid_amount, billing_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            draft.prescription_id,
            draft.total_amount,
            draft.paid_amount,
            draft.billing_date.format(DATE_FORMAT).to_string()
        ],
    )
    .context("failed to insert bill")?;

    let id = conn.last_insert_rowid();
    info!(id, prescription = draft.prescription_id, "bill generated");
    Ok(id)
}

pub fn update_bill(conn: &Connection, id: i64, draft: &BillDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE billing
             SET prescription_id = ?1, total_amount = ?2, paid_amount = ?3, billing_date = ?4
             WHERE id = ?5",
            params![
                draft.prescription_id,
                draft.total_amount,
                draft.paid_amount,
                draft.billing_date.format(DATE_FORMAT).to_string(),
                id
            ],
        )
        .context("failed to update bill")?;

    ensure_updated(updated, id)?;
    info!(id, "bill updated");
    Ok(())
}

/// Record a payment figure without touching the rest of the bill.
pub fn update_bill_payment(conn: &Connection, id: i64, paid_amount: f64) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE billing SET paid_amount = ?1 WHERE id = ?2",
            params![paid_amount, id],
        )
        .context("failed to update bill payment")?;

    ensure_updated(updated, id)?;
    info!(id, paid_amount, "bill payment updated");
    Ok(())
}

pub fn delete_bill(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM billing WHERE id = ?1", params![id])
        .context("failed to delete bill")?;

    if deleted == 0 {
        warn!(id, "no bill to delete");
    } else {
        info!(id, "bill deleted");
    }
    Ok(deleted > 0)
}

fn ensure_updated(updated: usize, id: i64) -> Result<()> {
    if updated == 0 {
        Err(ClinicError::NotFound { entity: "Bill", id })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn payment_update_keeps_other_fields() {
        let conn = open_in_memory().unwrap();
        let id = create_bill(
            &conn,
            &BillDraft {
                prescription_id: 3,
                total_amount: 120.0,
                paid_amount: 20.0,
                billing_date: NaiveDate::from_ymd_opt(2026, 5, 5).unwrap(),
            },
        )
        .unwrap();

        update_bill_payment(&conn, id, 120.0).unwrap();
        let bill = &fetch_bills(&conn).unwrap()[0];
        assert_eq!(bill.paid_amount, 120.0);
        assert_eq!(bill.total_amount, 120.0);
        assert_eq!(bill.billing_date, "2026-05-05");
        assert_eq!(bill.prescription_id, 3);
    }

    #[test]
    fn payment_update_on_missing_bill_fails() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(
            update_bill_payment(&conn, 8, 1.0),
            Err(ClinicError::NotFound { id: 8, .. })
        ));
    }
}
