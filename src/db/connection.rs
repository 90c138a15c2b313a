use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::{ClinicError, Result, StoreContext};

/// Table names in dependency order (referenced tables first).
pub const TABLES: [&str; 6] = [
    "doctors",
    "patients",
    "inventory",
    "prescriptions",
    "billing",
    "appointments",
];

/// Declarative schema. Every statement is `IF NOT EXISTS` so opening an
/// existing store is a no-op.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS doctors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        vcn TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        phone TEXT,
        email TEXT,
        graduated_year INTEGER
    );

    CREATE TABLE IF NOT EXISTS patients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        species TEXT,
        breed TEXT,
        owner_name TEXT,
        owner_contact TEXT
    );

    CREATE TABLE IF NOT EXISTS inventory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_name TEXT NOT NULL,
        description TEXT,
        quantity INTEGER NOT NULL DEFAULT 0,
        unit_price REAL NOT NULL DEFAULT 0,
        expiry_date TEXT
    );

    CREATE TABLE IF NOT EXISTS prescriptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL,
        doctor_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        diagnosis TEXT,
        medication TEXT,
        dosage TEXT,
        instructions TEXT,
        FOREIGN KEY(patient_id) REFERENCES patients(id),
        FOREIGN KEY(doctor_id) REFERENCES doctors(id)
    );

    CREATE TABLE IF NOT EXISTS billing (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prescription_id INTEGER NOT NULL,
        total_amount REAL NOT NULL,
        paid_amount REAL NOT NULL DEFAULT 0,
        billing_date TEXT NOT NULL,
        FOREIGN KEY(prescription_id) REFERENCES prescriptions(id)
    );

    CREATE TABLE IF NOT EXISTS appointments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL,
        doctor_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        reason TEXT,
        status TEXT DEFAULT 'Scheduled',
        FOREIGN KEY(patient_id) REFERENCES patients(id),
        FOREIGN KEY(doctor_id) REFERENCES doctors(id)
    );
";

/// Open (or create) the store at `path` and make sure every table exists.
///
/// Foreign keys are declared but `PRAGMA foreign_keys` is left at SQLite's
/// default (off): deleting a doctor, patient or prescription that is still
/// referenced succeeds and leaves the referencing rows orphaned.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ClinicError::Io {
            action: "failed to create data directory",
            source,
        })?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Fresh private database with the full schema. Used by tests and dry runs.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create any missing tables.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("failed to create clinic tables")
}

/// Drop and recreate all six tables inside one transaction. All rows are lost.
pub fn reset_schema(conn: &Connection) -> Result<()> {
    let mut script = String::from("BEGIN;\n");
    for table in TABLES.iter().rev() {
        script.push_str(&format!("DROP TABLE IF EXISTS {table};\n"));
    }
    script.push_str(SCHEMA);
    script.push_str("COMMIT;");

    if let Err(err) = conn.execute_batch(&script) {
        // A failed batch leaves the transaction open.
        if let Err(rollback) = conn.execute_batch("ROLLBACK") {
            warn!(error = %rollback, "rollback after failed schema reset also failed");
        }
        return Err(ClinicError::Store {
            action: "failed to reset clinic schema",
            source: err,
        });
    }

    info!("database schema recreated");
    Ok(())
}

/// Row count for one of [`TABLES`].
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    if !TABLES.contains(&table) {
        return Err(ClinicError::invalid("table", format!("unknown table '{table}'")));
    }
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .context("failed to count rows")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        for table in TABLES {
            assert_eq!(count_rows(&conn, table).unwrap(), 0);
        }
    }

    #[test]
    fn reset_schema_drops_existing_rows() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO patients (name, species, breed, owner_name, owner_contact)
             VALUES ('Rex', 'Dog', 'Beagle', 'Ann', '555')",
            [],
        )
        .unwrap();
        assert_eq!(count_rows(&conn, "patients").unwrap(), 1);

        reset_schema(&conn).unwrap();
        assert_eq!(count_rows(&conn, "patients").unwrap(), 0);
    }

    #[test]
    fn failed_reset_rolls_back_and_keeps_rows() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO patients (name, species, breed, owner_name, owner_contact)
             VALUES ('Rex', 'Dog', 'Beagle', 'Ann', '555')",
            [],
        )
        .unwrap();
        // An index squatting on a table name makes the CREATE TABLE step fail.
        conn.execute_batch(
            "DROP TABLE appointments;
             CREATE TABLE notes (body TEXT);
             CREATE INDEX appointments ON notes(body);",
        )
        .unwrap();

        let err = reset_schema(&conn).unwrap_err();
        assert!(matches!(err, ClinicError::Store { .. }));
        assert!(conn.is_autocommit(), "transaction left open");
        assert_eq!(count_rows(&conn, "patients").unwrap(), 1);
    }

    #[test]
    fn open_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clinic.sqlite");
        let conn = open_store(&path).unwrap();
        assert_eq!(count_rows(&conn, "doctors").unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn count_rows_rejects_unknown_tables() {
        let conn = open_in_memory().unwrap();
        assert!(count_rows(&conn, "sqlite_master; DROP TABLE doctors").is_err());
    }
}
