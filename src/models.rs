//! Domain models that mirror the SQLite schema and get passed throughout the
//! shells. Records are what `list` returns (joined names included); drafts are
//! the validated field sets handed to `insert`/`update`.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};

use crate::error::ClinicError;

/// Storage format for every date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for appointment times.
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct Doctor {
    pub id: i64,
    /// Veterinary council number. Unique across the table.
    pub license_code: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub graduation_year: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorDraft {
    pub license_code: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub graduation_year: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub owner_name: String,
    pub owner_contact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientDraft {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub owner_name: String,
    pub owner_contact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub expiry_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryDraft {
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub expiry_date: NaiveDate,
}

/// A prescription row with the patient and doctor names resolved. The names
/// are empty when the referenced row no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub date: String,
    pub diagnosis: String,
    pub medication: String,
    pub dosage: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionDraft {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub diagnosis: String,
    pub medication: String,
    pub dosage: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub id: i64,
    pub prescription_id: i64,
    pub patient_name: String,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub billing_date: String,
}

/// Paid may exceed total and neither amount is range-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct BillDraft {
    pub prescription_id: i64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub billing_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    /// Raw stored value. The schema does not constrain it, so rows written by
    /// other tools may carry anything; see [`Appointment::parsed_status`].
    pub status: String,
}

impl Appointment {
    pub fn parsed_status(&self) -> Option<AppointmentStatus> {
        self.status.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ClinicError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ClinicError::invalid(
                    "Status",
                    format!("Status must be Scheduled, Completed or Cancelled, not '{wanted}'."),
                )
            })
    }
}

/// An `(id, label)` pair used when prompting for a foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: i64,
    pub label: String,
}

impl fmt::Display for Choice {
    /// Same shape as reference cells in the tables, so a printed choice can be
    /// pasted straight back into a form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.id, self.label)
    }
}

/// One flagged bill from the underbilling report.
#[derive(Debug, Clone, PartialEq)]
pub struct UnderbilledBill {
    pub bill_id: i64,
    pub prescription_id: i64,
    pub patient_name: String,
    pub total_amount: f64,
    pub paid_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            " completed ".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Completed
        );
        assert!("Postponed".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn choice_display_matches_reference_cells() {
        let choice = Choice {
            id: 4,
            label: "Milo".into(),
        };
        assert_eq!(choice.to_string(), "4 - Milo");
    }
}
