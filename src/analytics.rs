//! The two clinic reports: medication demand over a recent window and bills
//! paid well below their total.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use rusqlite::{params, Connection};
use tracing::info;

use crate::error::{Result, StoreContext};
use crate::models::{UnderbilledBill, DATE_FORMAT};

/// One medication and how many prescriptions named it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugUsage {
    pub medication: String,
    pub count: usize,
}

/// Count medications prescribed on or after `today - window_days` and return
/// the `top_n` most frequent. Ties keep the order in which the medication was
/// first seen, scanning prescriptions by id.
pub fn predict_top_drugs(
    conn: &Connection,
    today: NaiveDate,
    window_days: u32,
    top_n: usize,
) -> Result<Vec<DrugUsage>> {
    let since = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN)
        .format(DATE_FORMAT)
        .to_string();

    let mut stmt = conn
        .prepare("SELECT medication FROM prescriptions WHERE date >= ?1 ORDER BY id")
        .context("failed to prepare medication query")?;
    let medications = stmt
        .query_map(params![since], |row| row.get::<_, Option<String>>(0))
        .context("failed to load medications")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect medications")?;

    let mut usage: Vec<DrugUsage> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for medication in medications.into_iter().map(Option::unwrap_or_default) {
        match position.get(&medication) {
            Some(&index) => usage[index].count += 1,
            None => {
                position.insert(medication.clone(), usage.len());
                usage.push(DrugUsage {
                    medication,
                    count: 1,
                });
            }
        }
    }

    // stable, so equal counts stay in first-seen order
    usage.sort_by(|a, b| b.count.cmp(&a.count));
    usage.truncate(top_n);

    info!(since = %since, found = usage.len(), "top drugs computed");
    Ok(usage)
}

/// Bills whose paid amount is strictly below `threshold * total`. Bills whose
/// prescription or patient no longer exists are skipped.
pub fn flag_underbilled(conn: &Connection, threshold: f64) -> Result<Vec<UnderbilledBill>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.id, b.prescription_id, pt.name, b.total_amount, b.paid_amount
             FROM billing b
             JOIN prescriptions p ON b.prescription_id = p.id
             JOIN patients pt ON p.patient_id = pt.id
             ORDER BY b.id",
        )
        .context("failed to prepare underbilling query")?;

    let bills = stmt
        .query_map([], |row| {
            Ok(UnderbilledBill {
                bill_id: row.get(0)?,
                prescription_id: row.get(1)?,
                patient_name: row.get(2)?,
                total_amount: row.get(3)?,
                paid_amount: row.get(4)?,
            })
        })
        .context("failed to load bills for underbilling")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect bills for underbilling")?;

    let flagged: Vec<UnderbilledBill> = bills
        .into_iter()
        .filter(|bill| bill.paid_amount < threshold * bill.total_amount)
        .collect();

    info!(threshold, flagged = flagged.len(), "underbilled bills flagged");
    Ok(flagged)
}

pub fn top_drugs_report(usage: &[DrugUsage], window_days: u32) -> Vec<String> {
    let mut lines = vec![format!("📈 Predicted Top Used Drugs (last {window_days} days):")];
    if usage.is_empty() {
        lines.push("No recent prescriptions found.".to_string());
    } else {
        lines.extend(usage.iter().enumerate().map(|(rank, drug)| {
            let times = if drug.count == 1 { "time" } else { "times" };
            format!("{}. {} - used {} {times}", rank + 1, drug.medication, drug.count)
        }));
    }
    lines
}

pub fn underbilled_report(bills: &[UnderbilledBill], threshold: f64, currency: &str) -> Vec<String> {
    let percent = (threshold * 100.0).round();
    let mut lines = vec![format!(
        "⚠️ Underbilled Prescriptions (paid < {percent}% of total):"
    )];
    if bills.is_empty() {
        lines.push("✅ No underbilled prescriptions found.".to_string());
    } else {
        lines.extend(bills.iter().map(|bill| {
            format!(
                "Bill #{} | Rx {} | {} | {currency}{:.2} / {currency}{:.2}",
                bill.bill_id,
                bill.prescription_id,
                bill.patient_name,
                bill.paid_amount,
                bill.total_amount
            )
        }));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_bill, create_patient, create_prescription, open_in_memory};
    use crate::models::{BillDraft, PatientDraft, PrescriptionDraft};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn prescribe(conn: &Connection, patient_id: i64, medication: &str, days_ago: u64) -> i64 {
        create_prescription(
            conn,
            &PrescriptionDraft {
                patient_id,
                doctor_id: 1,
                date: today().checked_sub_days(Days::new(days_ago)).unwrap(),
                diagnosis: "Checkup".into(),
                medication: medication.into(),
                dosage: String::new(),
                instructions: String::new(),
            },
        )
        .unwrap()
    }

    fn bill(conn: &Connection, prescription_id: i64, total: f64, paid: f64) -> i64 {
        create_bill(
            conn,
            &BillDraft {
                prescription_id,
                total_amount: total,
                paid_amount: paid,
                billing_date: today(),
            },
        )
        .unwrap()
    }

    fn patient(conn: &Connection, name: &str) -> i64 {
        create_patient(
            conn,
            &PatientDraft {
                name: name.into(),
                species: "Dog".into(),
                breed: String::new(),
                owner_name: String::new(),
                owner_contact: String::new(),
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn top_drugs_rank_by_count_then_first_seen() {
        let conn = open_in_memory().unwrap();
        for medication in ["A", "B", "A", "A", "C"] {
            prescribe(&conn, 1, medication, 3);
        }
        prescribe(&conn, 1, "C", 200);
        prescribe(&conn, 1, "C", 120);

        let usage = predict_top_drugs(&conn, today(), 90, 2).unwrap();
        assert_eq!(
            usage,
            vec![
                DrugUsage {
                    medication: "A".into(),
                    count: 3
                },
                DrugUsage {
                    medication: "B".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let conn = open_in_memory().unwrap();
        prescribe(&conn, 1, "Edge", 90);
        prescribe(&conn, 1, "Stale", 91);
        let usage = predict_top_drugs(&conn, today(), 90, 5).unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].medication, "Edge");
    }

    #[test]
    fn underbilled_uses_a_strict_threshold() {
        let conn = open_in_memory().unwrap();
        let rex = patient(&conn, "Rex");
        let short = bill(&conn, prescribe(&conn, rex, "A", 1), 100.0, 50.0);
        bill(&conn, prescribe(&conn, rex, "B", 1), 100.0, 70.0);
        bill(&conn, prescribe(&conn, rex, "C", 1), 100.0, 60.0);
        // prescription 999 does not exist, so the join drops it
        bill(&conn, 999, 100.0, 0.0);

        let flagged = flag_underbilled(&conn, 0.6).unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].bill_id, short);
        assert_eq!(flagged[0].patient_name, "Rex");
    }

    #[test]
    fn reports_render_empty_and_filled() {
        assert_eq!(
            top_drugs_report(&[], 90),
            vec![
                "📈 Predicted Top Used Drugs (last 90 days):".to_string(),
                "No recent prescriptions found.".to_string()
            ]
        );

        let bills = [UnderbilledBill {
            bill_id: 4,
            prescription_id: 2,
            patient_name: "Rex".into(),
            total_amount: 100.0,
            paid_amount: 50.0,
        }];
        let lines = underbilled_report(&bills, 0.6, "₹");
        assert_eq!(lines[0], "⚠️ Underbilled Prescriptions (paid < 60% of total):");
        assert_eq!(lines[1], "Bill #4 | Rx 2 | Rex | ₹50.00 / ₹100.00");
    }
}
