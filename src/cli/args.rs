//! CLI argument definitions using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DB_ENV_VAR;

#[derive(Parser, Debug)]
#[command(name = "vet-clinic")]
#[command(version, about = "Record keeping for a small veterinary clinic")]
#[command(
    long_about = "Doctors, patients, inventory, prescriptions, billing and appointments in a local SQLite file, with a terminal UI, a numbered menu and one-shot report commands."
)]
pub struct Cli {
    /// Defaults to the terminal UI
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// SQLite database file (default: ~/.vet-clinic-manager/clinic.sqlite)
    #[arg(long, global = true, env = DB_ENV_VAR)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.vet-clinic-manager/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Full-screen terminal interface
    Tui,

    /// Numbered text menu on stdin/stdout
    Menu,

    /// Create missing tables
    Init {
        /// Drop every table first. All rows are lost.
        #[arg(long)]
        reset: bool,
    },

    /// Insert random sample records
    Seed,

    /// Most prescribed medications in a recent window
    TopDrugs {
        /// Window length in days (default from config, 90)
        #[arg(long)]
        days: Option<u32>,

        /// How many medications to list (default from config, 5)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Bills paid below a fraction of their total
    Underbilled {
        /// Fraction of the total, e.g. 0.6 (default from config)
        #[arg(long)]
        threshold: Option<f64>,
    },
}
