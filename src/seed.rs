//! Random but plausible clinic data for demos and manual testing.

use chrono::{Days, NaiveDate, NaiveTime};
use rand::Rng;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{
    create_appointment, create_bill, create_doctor, create_item, create_patient,
    create_prescription,
};
use crate::error::{ClinicError, Result};
use crate::models::{
    AppointmentDraft, AppointmentStatus, BillDraft, DoctorDraft, InventoryDraft, PatientDraft,
    PrescriptionDraft,
};

const DOCTORS: usize = 5;
const PATIENTS: usize = 5;
const PRESCRIPTIONS: usize = 5;
const APPOINTMENTS: usize = 3;
const LICENSE_ATTEMPTS: usize = 20;

const FIRST_NAMES: &[&str] = &[
    "Amelia", "Ben", "Carmen", "Dev", "Elena", "Farah", "George", "Hana", "Ivan", "Julia", "Kofi",
    "Leah", "Marco", "Nina", "Omar", "Priya", "Quinn", "Rosa", "Sam", "Tariq",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Brennan", "Chowdhury", "Diaz", "Evans", "Fischer", "Gupta", "Hughes", "Ito",
    "Jensen", "Kowalski", "Lopez", "Mensah", "Novak", "Okafor", "Patel", "Reyes", "Suzuki",
];

struct Species {
    name: &'static str,
    breeds: &'static [&'static str],
    names: &'static [&'static str],
}

const SPECIES: &[Species] = &[
    Species {
        name: "Dog",
        breeds: &["Labrador Retriever", "German Shepherd", "Golden Retriever", "Bulldog", "Beagle"],
        names: &["Buddy", "Max", "Bella", "Charlie", "Lucy"],
    },
    Species {
        name: "Cat",
        breeds: &["Siamese", "Persian", "Maine Coon", "Ragdoll", "Bengal"],
        names: &["Luna", "Oliver", "Leo", "Milo", "Chloe"],
    },
    Species {
        name: "Rabbit",
        breeds: &["Holland Lop", "Flemish Giant", "Mini Rex", "Lionhead"],
        names: &["Bun", "Thumper", "Cottontail", "Pepper"],
    },
    Species {
        name: "Bird",
        breeds: &["Parrot", "Cockatiel", "Canary", "Macaw"],
        names: &["Polly", "Sunny", "Blue", "Kiwi"],
    },
    Species {
        name: "Reptile",
        breeds: &["Bearded Dragon", "Leopard Gecko", "Ball Python"],
        names: &["Spike", "Slither", "Scales"],
    },
];

/// (name, description, unit price)
const INVENTORY: &[(&str, &str, f64)] = &[
    ("Amoxicillin 250mg", "Broad-spectrum antibiotic capsules", 14.99),
    ("Meloxicam 1.5mg", "NSAID pain relief tablets", 32.50),
    ("Heartgard Plus", "Monthly heartworm preventative", 65.75),
    ("Frontline Plus", "Flea and tick topical treatment", 45.20),
    ("Clavamox Drops", "Antibiotic oral suspension", 28.30),
    ("Rimadyl 75mg", "Carprofen pain relief tablets", 42.60),
    ("Epi-Otic", "Ear cleaning solution", 16.95),
    ("Baytril 22.7mg", "Antibiotic tablets", 38.40),
    ("Revolution", "Parasite prevention topical", 52.90),
    ("Drontal Plus", "Dewormer tablets", 19.75),
];

/// (diagnosis, medication, dosage)
const DIAGNOSES: &[(&str, &str, &str)] = &[
    ("Otitis externa", "Amoxicillin 250mg", "1 capsule twice daily for 10 days"),
    ("Periodontal disease", "Clavamox Drops", "0.5ml twice daily for 14 days"),
    ("Arthritis", "Rimadyl 75mg", "1 tablet daily with food"),
    ("UTI", "Baytril 22.7mg", "1 tablet twice daily for 7 days"),
    ("Flea allergy", "Frontline Plus", "Apply topically monthly"),
    ("Gastroenteritis", "Metronidazole 250mg", "1 tablet twice daily for 5 days"),
    ("Kennel cough", "Doxycycline 100mg", "1 capsule daily for 10 days"),
];

const INSTRUCTIONS: &[&str] = &[
    "Give with food",
    "Complete full course",
    "Monitor for side effects",
    "Follow up if no improvement",
    "Keep animal hydrated",
];

/// Service base prices that bill totals are drawn around.
const SERVICES: &[(&str, f64)] = &[
    ("Examination", 45.00),
    ("Vaccination", 35.00),
    ("Blood Test", 85.00),
    ("X-Ray", 120.00),
    ("Dental Cleaning", 200.00),
    ("Suture Wound", 150.00),
    ("Nail Trim", 15.00),
    ("Anal Gland Expression", 25.00),
];

const VISIT_REASONS: &[&str] = &[
    "Annual checkup",
    "Vaccination",
    "Follow-up",
    "Dental cleaning",
    "Skin irritation",
    "Limping",
];

/// Rows inserted per table by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub doctors: usize,
    pub patients: usize,
    pub inventory: usize,
    pub prescriptions: usize,
    pub bills: usize,
    pub appointments: usize,
}

impl SeedSummary {
    pub fn total(&self) -> usize {
        self.doctors
            + self.patients
            + self.inventory
            + self.prescriptions
            + self.bills
            + self.appointments
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("✅ Inserted {} rows of sample data:", self.total()),
            format!("  doctors: {}", self.doctors),
            format!("  patients: {}", self.patients),
            format!("  inventory: {}", self.inventory),
            format!("  prescriptions: {}", self.prescriptions),
            format!("  bills: {}", self.bills),
            format!("  appointments: {}", self.appointments),
        ]
    }
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "({}) {}-{}",
        rng.random_range(200..=999),
        rng.random_range(200..=999),
        rng.random_range(1000..=9999)
    )
}

fn person_name<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, &'static str) {
    (*pick(rng, FIRST_NAMES), *pick(rng, LAST_NAMES))
}

fn days_before<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate, max_days: u64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(rng.random_range(0..=max_days)))
        .unwrap_or(today)
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Insert a fixed-size batch of random clinic records. Existing rows are left
/// alone; references point at the rows created by this run.
pub fn seed_fixture_data<R: Rng + ?Sized>(
    conn: &Connection,
    rng: &mut R,
    today: NaiveDate,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let mut doctor_ids = Vec::with_capacity(DOCTORS);
    for _ in 0..DOCTORS {
        doctor_ids.push(seed_doctor(conn, rng)?);
        summary.doctors += 1;
    }

    let mut patient_ids = Vec::with_capacity(PATIENTS);
    for _ in 0..PATIENTS {
        let species = pick(rng, SPECIES);
        let (first, last) = person_name(rng);
        let patient = create_patient(
            conn,
            &PatientDraft {
                name: pick(rng, species.names).to_string(),
                species: species.name.to_string(),
                breed: pick(rng, species.breeds).to_string(),
                owner_name: format!("{first} {last}"),
                owner_contact: phone_number(rng),
            },
        )?;
        patient_ids.push(patient.id);
        summary.patients += 1;
    }

    for &(name, description, unit_price) in INVENTORY {
        for _ in 0..rng.random_range(3..=10) {
            let expiry_date = today
                .checked_add_days(Days::new(rng.random_range(30..=730)))
                .unwrap_or(today);
            create_item(
                conn,
                &InventoryDraft {
                    name: name.to_string(),
                    description: description.to_string(),
                    quantity: rng.random_range(5..=50),
                    unit_price,
                    expiry_date,
                },
            )?;
            summary.inventory += 1;
        }
    }

    for _ in 0..PRESCRIPTIONS {
        let &(diagnosis, medication, dosage) = pick(rng, DIAGNOSES);
        let date = days_before(rng, today, 730);
        let prescription_id = create_prescription(
            conn,
            &PrescriptionDraft {
                patient_id: *pick(rng, &patient_ids),
                doctor_id: *pick(rng, &doctor_ids),
                date,
                diagnosis: diagnosis.to_string(),
                medication: medication.to_string(),
                dosage: dosage.to_string(),
                instructions: pick(rng, INSTRUCTIONS).to_string(),
            },
        )?;
        summary.prescriptions += 1;

        let &(_, base_price) = pick(rng, SERVICES);
        let total_amount = cents(base_price * rng.random_range(0.9..1.5));
        let paid_amount = cents(total_amount * rng.random_range(0.8..=1.0));
        let billing_date = date
            .checked_add_days(Days::new(rng.random_range(0..=14)))
            .map_or(today, |billed| billed.min(today));
        create_bill(
            conn,
            &BillDraft {
                prescription_id,
                total_amount,
                paid_amount,
                billing_date,
            },
        )?;
        summary.bills += 1;
    }

    for _ in 0..APPOINTMENTS {
        let offset = rng.random_range(-30i64..=30);
        let date = if offset < 0 {
            today.checked_sub_days(Days::new(offset.unsigned_abs()))
        } else {
            today.checked_add_days(Days::new(offset.unsigned_abs()))
        }
        .unwrap_or(today);
        let slot = rng.random_range(0..18u32);
        let time = NaiveTime::from_hms_opt(9 + slot / 2, (slot % 2) * 30, 0).unwrap_or_default();
        let status = if date >= today {
            AppointmentStatus::Scheduled
        } else if rng.random_bool(0.8) {
            AppointmentStatus::Completed
        } else {
            AppointmentStatus::Cancelled
        };
        create_appointment(
            conn,
            &AppointmentDraft {
                patient_id: *pick(rng, &patient_ids),
                doctor_id: *pick(rng, &doctor_ids),
                date,
                time,
                reason: pick(rng, VISIT_REASONS).to_string(),
                status,
            },
        )?;
        summary.appointments += 1;
    }

    info!(rows = summary.total(), "sample data inserted");
    Ok(summary)
}

/// License codes are random, so a clash with an existing doctor is retried
/// with a fresh code.
fn seed_doctor<R: Rng + ?Sized>(conn: &Connection, rng: &mut R) -> Result<i64> {
    let (first, last) = person_name(rng);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let draft = DoctorDraft {
            license_code: format!("VCN{:06}", rng.random_range(0..1_000_000)),
            name: format!("Dr. {first} {last}"),
            phone: phone_number(rng),
            email: format!(
                "dr.{}.{}@vetclinic.com",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            graduation_year: rng.random_range(1990..=2020),
        };
        match create_doctor(conn, &draft) {
            Ok(doctor) => return Ok(doctor.id),
            Err(ClinicError::DuplicateLicense(code)) if attempt < LICENSE_ATTEMPTS => {
                warn!(code = %code, attempt, "license code taken, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::db::{count_rows, fetch_bills, fetch_doctors, fetch_items, open_in_memory};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    #[test]
    fn seeding_fills_every_table() {
        let conn = open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let summary = seed_fixture_data(&conn, &mut rng, today()).unwrap();

        assert_eq!(summary.doctors, 5);
        assert_eq!(summary.patients, 5);
        assert_eq!(summary.prescriptions, 5);
        assert_eq!(summary.bills, 5);
        assert_eq!(summary.appointments, 3);
        assert!((30..=100).contains(&summary.inventory));
        assert_eq!(count_rows(&conn, "inventory").unwrap(), summary.inventory as i64);
        assert_eq!(summary.lines().len(), 7);
    }

    #[test]
    fn seeded_values_respect_their_ranges() {
        let conn = open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        seed_fixture_data(&conn, &mut rng, today()).unwrap();

        for doctor in fetch_doctors(&conn).unwrap() {
            assert!(doctor.license_code.starts_with("VCN"));
            assert_eq!(doctor.license_code.len(), 9);
            assert!((1990..=2020).contains(&doctor.graduation_year));
        }
        for item in fetch_items(&conn).unwrap() {
            assert!(item.expiry_date > "2026-11-12".to_string());
            assert!((5..=50).contains(&item.quantity));
        }
        for bill in fetch_bills(&conn).unwrap() {
            assert!(bill.paid_amount <= bill.total_amount);
            assert!(bill.paid_amount >= cents(bill.total_amount * 0.8) - 0.01);
            assert!(bill.billing_date.as_str() <= "2026-10-14");
        }
    }

    #[test]
    fn seeding_twice_keeps_license_codes_unique() {
        let conn = open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        seed_fixture_data(&conn, &mut rng, today()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        seed_fixture_data(&conn, &mut rng, today()).unwrap();
        assert_eq!(count_rows(&conn, "doctors").unwrap(), 10);
    }
}
