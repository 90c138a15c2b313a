//! Error taxonomy shared by the persistence layer, the CRUD tabs, and both
//! presentation shells. Validation and uniqueness problems are user-facing and
//! never reach the store; `Store` wraps whatever SQLite reports for anything
//! unexpected so the caller can show it and keep running.

use std::path::PathBuf;

use thiserror::Error;

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, ClinicError>;

#[derive(Debug, Error)]
pub enum ClinicError {
    /// One or more form fields failed to parse. `fields` carries the headings
    /// so the message can point at exactly what to fix.
    #[error("{reason} (check: {})", .fields.join(", "))]
    Validation {
        fields: Vec<&'static str>,
        reason: String,
    },

    /// Doctor license codes are `UNIQUE` in the schema.
    #[error("License code '{0}' already exists; code must be unique.")]
    DuplicateLicense(String),

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{action}")]
    Store {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{action}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl ClinicError {
    /// Build a validation error for a single field.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ClinicError::Validation {
            fields: vec![field],
            reason: reason.into(),
        }
    }

    /// True for the error classes a user can fix by editing the form.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ClinicError::Validation { .. } | ClinicError::DuplicateLicense(_)
        )
    }

    /// One line for dialogs and printed failures: the action plus the root
    /// cause for wrapped errors, the message itself otherwise.
    pub fn user_message(&self) -> String {
        match self {
            ClinicError::Store { .. } | ClinicError::Io { .. } => {
                format!("{self}: {}", surface_error(self))
            }
            _ => self.to_string(),
        }
    }
}

/// Mirrors `anyhow::Context` for raw rusqlite results so query code reads the
/// same way it does elsewhere in the crate.
pub(crate) trait StoreContext<T> {
    fn context(self, action: &'static str) -> Result<T>;
}

impl<T> StoreContext<T> for std::result::Result<T, rusqlite::Error> {
    fn context(self, action: &'static str) -> Result<T> {
        self.map_err(|source| ClinicError::Store { action, source })
    }
}

/// Extract the most relevant message from an error and its sources. Store
/// errors surface the underlying SQLite text; everything else shows itself.
pub fn surface_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    let mut message = err.to_string();
    while let Some(source) = current.source() {
        message = source.to_string();
        current = source;
    }
    message
}
