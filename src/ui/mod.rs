//! Ratatui front-end: one tab per clinic table plus a log pane for
//! background task output.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
