//! Configuration with a layered hierarchy: built-in defaults, then
//! `config.toml` in the data directory (or an explicit `--config` file), then
//! the database override from the environment or command line.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClinicError, Result};

/// Directory under the user's home holding the database, config and log.
pub const DATA_DIR_NAME: &str = ".vet-clinic-manager";
pub const DB_FILE_NAME: &str = "clinic.sqlite";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "vet-clinic.log";

/// Environment variable overriding the database path.
pub const DB_ENV_VAR: &str = "VET_CLINIC_DB";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    /// Prefix for amounts in reports.
    pub currency_symbol: String,
    pub top_drugs_window_days: u32,
    pub top_drugs_count: usize,
    /// Bills paid below this fraction of their total are flagged.
    pub underbilled_threshold: f64,
    pub dark_mode: bool,
    /// `tracing` filter directive used when `VET_CLINIC_LOG` is unset.
    pub log_filter: Option<String>,
}

/// On-disk shape. Every key is optional; present keys replace defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    currency_symbol: Option<String>,
    top_drugs_window_days: Option<u32>,
    top_drugs_count: Option<usize>,
    underbilled_threshold: Option<f64>,
    dark_mode: Option<bool>,
    log_filter: Option<String>,
}

/// `~/.vet-clinic-manager`.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| ClinicError::Config {
        path: PathBuf::from("~"),
        reason: "could not locate home directory".to_string(),
    })?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

impl Config {
    /// Built-in defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            database_path: data_dir.join(DB_FILE_NAME),
            currency_symbol: "₹".to_string(),
            top_drugs_window_days: 90,
            top_drugs_count: 5,
            underbilled_threshold: 0.6,
            dark_mode: false,
            log_filter: None,
        }
    }

    /// Load from the user's data directory.
    pub fn load(config_path: Option<&Path>, database_override: Option<PathBuf>) -> Result<Self> {
        Self::load_from(&data_dir()?, config_path, database_override)
    }

    /// Merge, in priority order: defaults for `data_dir`, the config file,
    /// then `database_override`. The default file may be absent; an explicit
    /// `config_path` must exist.
    pub fn load_from(
        data_dir: &Path,
        config_path: Option<&Path>,
        database_override: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = Self::with_data_dir(data_dir);

        let (path, required) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => (data_dir.join(CONFIG_FILE_NAME), false),
        };
        if required || path.exists() {
            let file = read_config_file(&path)?;
            let base = path.parent().unwrap_or(data_dir);
            config.merge(file, base);
            debug!(path = %path.display(), "config file loaded");
        }

        if let Some(database_path) = database_override {
            config.database_path = database_path;
        }
        Ok(config)
    }

    fn merge(&mut self, file: ConfigFile, base: &Path) {
        if let Some(database_path) = file.database_path {
            // relative paths are taken from the config file's directory
            self.database_path = base.join(database_path);
        }
        if let Some(symbol) = file.currency_symbol {
            self.currency_symbol = symbol;
        }
        if let Some(days) = file.top_drugs_window_days {
            self.top_drugs_window_days = days;
        }
        if let Some(count) = file.top_drugs_count {
            self.top_drugs_count = count;
        }
        if let Some(threshold) = file.underbilled_threshold {
            self.underbilled_threshold = threshold;
        }
        if let Some(dark_mode) = file.dark_mode {
            self.dark_mode = dark_mode;
        }
        if file.log_filter.is_some() {
            self.log_filter = file.log_filter;
        }
    }

    /// Log file used by the terminal UI, kept next to the database.
    pub fn log_path(&self) -> PathBuf {
        match self.database_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(LOG_FILE_NAME),
            _ => PathBuf::from(LOG_FILE_NAME),
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path).map_err(|err| ClinicError::Config {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    toml::from_str(&contents).map_err(|err| ClinicError::Config {
        path: path.to_path_buf(),
        reason: err.message().to_string(),
    })
}
