//! Record keeping for a small veterinary clinic: doctors, patients, inventory,
//! prescriptions, billing and appointments in one SQLite store, with a terminal
//! UI, a numbered menu shell and a couple of analytics reports.
pub mod analytics;
pub mod cli;
pub mod clock;
pub mod config;
pub mod crud;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod seed;
pub mod tasks;
pub mod ui;

pub use config::Config;
pub use db::{ensure_schema, open_store};
pub use error::{ClinicError, Result};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
