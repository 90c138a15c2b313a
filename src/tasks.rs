//! Long-running actions executed off the UI thread. The worker opens its own
//! connection and reports back over a channel; the UI drains it every tick.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{error, info};

use crate::analytics::{
    flag_underbilled, predict_top_drugs, top_drugs_report, underbilled_report,
};
use crate::clock::Clock;
use crate::db::{open_store, reset_schema};
use crate::error::Result;
use crate::seed::seed_fixture_data;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskKind {
    ResetSchema,
    Seed,
    TopDrugs { window_days: u32, top_n: usize },
    Underbilled { threshold: f64 },
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::ResetSchema => "Reset schema",
            TaskKind::Seed => "Insert sample data",
            TaskKind::TopDrugs { .. } => "Predict top drugs",
            TaskKind::Underbilled { .. } => "Flag underbilled",
        }
    }

    /// Whether the tabs need reloading once the task ends.
    pub fn changes_data(&self) -> bool {
        matches!(self, TaskKind::ResetSchema | TaskKind::Seed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Line(String),
    Finished { task: TaskKind, ok: bool },
}

/// Returned when a task is requested while another is still running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Busy {
    pub running: TaskKind,
}

/// Runs at most one background task at a time.
pub struct TaskRunner {
    db_path: PathBuf,
    currency: String,
    clock: Arc<dyn Clock>,
    events: Option<Receiver<TaskEvent>>,
    running: Option<TaskKind>,
}

impl TaskRunner {
    pub fn new(db_path: PathBuf, currency: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            db_path,
            currency: currency.into(),
            clock,
            events: None,
            running: None,
        }
    }

    pub fn running(&self) -> Option<TaskKind> {
        self.running
    }

    pub fn start(&mut self, task: TaskKind) -> std::result::Result<(), Busy> {
        if let Some(running) = self.running {
            return Err(Busy { running });
        }

        let (tx, rx) = mpsc::channel();
        let db_path = self.db_path.clone();
        let currency = self.currency.clone();
        let clock = Arc::clone(&self.clock);

        info!(task = task.label(), "background task started");
        thread::spawn(move || {
            let ok = match run_task(task, &db_path, &currency, clock.as_ref(), &tx) {
                Ok(()) => true,
                Err(err) => {
                    error!(task = task.label(), error = %err, "background task failed");
                    let _ = tx.send(TaskEvent::Line(format!("❌ {}", err.user_message())));
                    false
                }
            };
            let _ = tx.send(TaskEvent::Finished { task, ok });
        });

        self.events = Some(rx);
        self.running = Some(task);
        Ok(())
    }

    /// Collect every event delivered since the last call without blocking.
    pub fn drain(&mut self) -> Vec<TaskEvent> {
        let mut drained = Vec::new();
        let Some(events) = self.events.take() else {
            return drained;
        };

        loop {
            match events.try_recv() {
                Ok(event) => {
                    let finished = matches!(event, TaskEvent::Finished { .. });
                    drained.push(event);
                    if finished {
                        self.running = None;
                        return drained;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // worker died without reporting
                    if let Some(task) = self.running.take() {
                        drained.push(TaskEvent::Finished { task, ok: false });
                    }
                    return drained;
                }
            }
        }

        self.events = Some(events);
        drained
    }
}

fn run_task(
    task: TaskKind,
    db_path: &std::path::Path,
    currency: &str,
    clock: &dyn Clock,
    tx: &Sender<TaskEvent>,
) -> Result<()> {
    let send = |line: String| {
        let _ = tx.send(TaskEvent::Line(line));
    };

    let conn = open_store(db_path)?;
    match task {
        TaskKind::ResetSchema => {
            reset_schema(&conn)?;
            send("✅ Database initialized.".to_string());
        }
        TaskKind::Seed => {
            let summary = seed_fixture_data(&conn, &mut rand::rng(), clock.today())?;
            summary.lines().into_iter().for_each(send);
        }
        TaskKind::TopDrugs {
            window_days,
            top_n,
        } => {
            let usage = predict_top_drugs(&conn, clock.today(), window_days, top_n)?;
            top_drugs_report(&usage, window_days)
                .into_iter()
                .for_each(send);
        }
        TaskKind::Underbilled { threshold } => {
            let flagged = flag_underbilled(&conn, threshold)?;
            underbilled_report(&flagged, threshold, currency)
                .into_iter()
                .for_each(send);
        }
    }
    Ok(())
}
