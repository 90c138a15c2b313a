use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ClinicError, Result};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV_VAR: &str = "VET_CLINIC_LOG";

/// Where log lines go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    /// Standard error, for the line-oriented commands.
    Stderr,
    /// Append to a file. The terminal UI owns the screen, so it logs here.
    File(&'a Path),
}

/// `VET_CLINIC_LOG` first, then the configured directive, then `info`.
fn build_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .ok()
        .or_else(|| configured.and_then(|directive| EnvFilter::try_new(directive).ok()))
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ClinicError::Io {
            action: "failed to create log directory",
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ClinicError::Io {
            action: "failed to open log file",
            source,
        })
}

/// Install the global subscriber. Must be called once at startup; later calls
/// leave the first subscriber in place.
pub fn init(target: LogTarget<'_>, configured_filter: Option<&str>) -> Result<()> {
    let filter = build_filter(configured_filter);
    let builder = fmt().with_env_filter(filter).with_target(false).compact();

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init().is_ok(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
    };

    if installed {
        info!("logging initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_target_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vet-clinic.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
