//! Binary entry point: parse arguments and hand off to the chosen surface.
use clap::Parser;
use vet_clinic_manager::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    cli::run(Cli::parse())
}
