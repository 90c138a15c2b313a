//! Command-line surface: argument parsing and dispatch to the terminal UI,
//! the numbered menu, or one-shot commands.

pub mod args;
pub mod menu;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analytics::{
    flag_underbilled, predict_top_drugs, top_drugs_report, underbilled_report,
};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::{ensure_schema, open_store, reset_schema};
use crate::logging::{self, LogTarget};
use crate::seed::seed_fixture_data;
use crate::ui::{run_app, App};

pub use args::{Cli, Commands, GlobalOpts};
pub use menu::MenuShell;

/// Load configuration, install logging for the chosen surface and run it.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.global.config.as_deref(), cli.global.db.clone())
        .context("failed to load configuration")?;
    let command = cli.command.unwrap_or(Commands::Tui);

    let log_path = config.log_path();
    let target = match command {
        Commands::Tui => LogTarget::File(&log_path),
        _ => LogTarget::Stderr,
    };
    logging::init(target, config.log_filter.as_deref()).context("failed to start logging")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    run_command(command, &config, clock)
}

fn run_command(command: Commands, config: &Config, clock: Arc<dyn Clock>) -> Result<()> {
    let conn = open_store(&config.database_path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database_path.display()
        )
    })?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Tui => {
            drop(out);
            let mut app = App::new(conn, config, clock)?;
            run_app(&mut app)
        }
        Commands::Menu => {
            let stdin = io::stdin();
            let mut shell = MenuShell::new(&conn, config, clock.as_ref(), stdin.lock(), out);
            shell.run()
        }
        Commands::Init { reset } => {
            if reset {
                reset_schema(&conn)?;
            } else {
                ensure_schema(&conn)?;
            }
            writeln!(
                out,
                "✅ Database initialized at {}",
                config.database_path.display()
            )?;
            Ok(())
        }
        Commands::Seed => {
            let summary = seed_fixture_data(&conn, &mut rand::rng(), clock.today())?;
            for line in summary.lines() {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Commands::TopDrugs { days, top } => {
            let days = days.unwrap_or(config.top_drugs_window_days);
            let top = top.unwrap_or(config.top_drugs_count);
            let usage = predict_top_drugs(&conn, clock.today(), days, top)?;
            for line in top_drugs_report(&usage, days) {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Commands::Underbilled { threshold } => {
            let threshold = threshold.unwrap_or(config.underbilled_threshold);
            let flagged = flag_underbilled(&conn, threshold)?;
            for line in underbilled_report(&flagged, threshold, &config.currency_symbol) {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
    }
}
