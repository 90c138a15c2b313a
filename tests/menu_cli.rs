use std::io::Cursor;

use chrono::NaiveDate;
use vet_clinic_manager::cli::MenuShell;
use vet_clinic_manager::clock::FixedClock;
use vet_clinic_manager::config::Config;
use vet_clinic_manager::db::{count_rows, open_store};

fn run_menu(dir: &tempfile::TempDir, script: &str) -> String {
    let config = Config::with_data_dir(dir.path());
    let conn = open_store(&config.database_path).unwrap();
    let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());

    let mut shell = MenuShell::new(
        &conn,
        &config,
        &clock,
        Cursor::new(script.to_string()),
        Vec::new(),
    );
    shell.run().unwrap();
    String::from_utf8(shell.into_output()).unwrap()
}

#[test]
fn adding_a_patient_shows_it_in_the_listing() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_menu(&dir, "4\n1\nRex\nDog\nBeagle\nAsha\n555-0101\n2\n0\n0\n");

    assert!(output.contains("--- Patients ---"));
    assert!(output.contains("✅ Patient #1 added."));
    assert!(output.contains("Beagle"));
    assert!(output.contains("Owner Contact"));
    assert!(output.trim_end().ends_with("Goodbye! 🐶"));
}

#[test]
fn invalid_quantity_is_reported_and_nothing_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_menu(&dir, "5\n1\nGauze\nSterile pads\nlots\n2.50\n2027-01-01\n0\n0\n");

    assert!(output.contains("❌"));
    assert!(output.contains("must be a non-negative integer"));
    assert!(!output.contains("added."));

    let conn = open_store(&Config::with_data_dir(dir.path()).database_path).unwrap();
    assert_eq!(count_rows(&conn, "inventory").unwrap(), 0);
}

#[test]
fn delete_asks_before_removing() {
    let dir = tempfile::tempdir().unwrap();
    let script = concat!(
        "4\n1\nRex\nDog\n\n\n\n",
        "4\n1\nn\n",
        "4\n1\ny\n",
        "2\n0\n0\n",
    );
    let output = run_menu(&dir, script);

    assert!(output.contains("Delete Patient #1 (Rex)? [y/N]: "));
    assert!(output.contains("Cancelled."));
    assert!(output.contains("🗑️ Patient #1 deleted."));
    assert!(output.contains("No records found."));
}

#[test]
fn edit_keeps_values_left_blank() {
    let dir = tempfile::tempdir().unwrap();
    let script = concat!(
        "4\n1\nRex\nDog\nBeagle\nAsha\n555-0101\n",
        "3\n1\n\n\nCollie\n\n\n",
        "2\n0\n0\n",
    );
    let output = run_menu(&dir, script);

    assert!(output.contains("Name [Rex]: "));
    assert!(output.contains("✅ Patient #1 updated."));
    assert!(output.contains("Collie"));
    assert!(output.contains("Asha"));
}

#[test]
fn end_of_input_quits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_menu(&dir, "");
    assert!(output.contains("9. Analytics"));
    assert!(output.trim_end().ends_with("Goodbye! 🐶"));
}

#[test]
fn analytics_on_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_menu(&dir, "9\n1\n2\n0\n0\n");
    assert!(output.contains("No recent prescriptions found."));
    assert!(output.contains("✅ No underbilled prescriptions found."));
}
