use assert_cmd::Command;
use predicates::prelude::*;

fn vet_clinic(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vet-clinic").unwrap();
    cmd.arg("--db")
        .arg(dir.path().join("clinic.sqlite"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .env_remove("VET_CLINIC_DB")
        .env("VET_CLINIC_LOG", "warn");
    cmd
}

fn write_config(dir: &tempfile::TempDir, body: &str) {
    std::fs::write(dir.path().join("config.toml"), body).unwrap();
}

#[test]
fn init_creates_the_database() {
    let dir = tempfile::tempdir().unwrap();
    write_config(&dir, "");
    vet_clinic(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));
    assert!(dir.path().join("clinic.sqlite").exists());
}

#[test]
fn seed_then_reports() {
    let dir = tempfile::tempdir().unwrap();
    write_config(&dir, "currency_symbol = \"$\"\n");

    vet_clinic(&dir)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("doctors: 5").and(predicate::str::contains("bills: 5")));

    vet_clinic(&dir)
        .args(["top-drugs", "--days", "3650", "--top", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Predicted Top Used Drugs (last 3650 days)"))
        .stdout(predicate::str::contains("1. "));

    vet_clinic(&dir)
        .args(["underbilled", "--threshold", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("paid < 50% of total"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    vet_clinic(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}
