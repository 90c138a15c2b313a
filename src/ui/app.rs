use std::mem;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::info;

use crate::clock::Clock;
use crate::config::Config;
use crate::crud::{clinic_tables, ColumnKind, CrudOutcome, CrudTab, RowParity};
use crate::error::ClinicError;
use crate::tasks::{TaskEvent, TaskKind, TaskRunner};

use super::forms::{cursor_offset, form_lines, ConfirmDelete, MessageDialog};
use super::helpers::{centered_rect, heading_label, StatusKind, Theme};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const TAB_BAR_HEIGHT: u16 = 3;
const SEARCH_BAR_HEIGHT: u16 = 3;
/// Rows moved by PgUp/PgDn.
const PAGE_STEP: isize = 10;
const LOG_TITLE: &str = "Log";

/// Which pane fills the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Records(usize),
    Log,
}

/// Input modes scoped to the current screen.
enum Mode {
    Normal,
    /// Live filter editing; `previous` is restored on Esc.
    Searching { previous: String },
    Editing,
    ConfirmDelete(ConfirmDelete),
    ConfirmReset,
    Message(MessageDialog),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    clock: Arc<dyn Clock>,
    tabs: Vec<CrudTab>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    theme: Theme,
    tasks: TaskRunner,
    log: Vec<String>,
    /// Lines scrolled up from the newest log entry.
    log_offset: usize,
    top_drugs_window_days: u32,
    top_drugs_count: usize,
    underbilled_threshold: f64,
}

impl App {
    pub fn new(conn: Connection, config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut tabs: Vec<CrudTab> = clinic_tables().into_iter().map(CrudTab::new).collect();
        for tab in &mut tabs {
            tab.refresh(&conn)
                .with_context(|| format!("failed to load {}", tab.title()))?;
        }

        let tasks = TaskRunner::new(
            config.database_path.clone(),
            config.currency_symbol.clone(),
            Arc::clone(&clock),
        );

        Ok(Self {
            conn,
            clock,
            tabs,
            screen: Screen::Records(0),
            mode: Mode::Normal,
            status: None,
            theme: Theme {
                dark: config.dark_mode,
            },
            tasks,
            log: Vec::new(),
            log_offset: 0,
            top_drugs_window_days: config.top_drugs_window_days,
            top_drugs_count: config.top_drugs_count,
            underbilled_threshold: config.underbilled_threshold,
        })
    }

    /// Apply everything the background worker reported since the last tick.
    pub fn tick(&mut self) {
        for event in self.tasks.drain() {
            match event {
                TaskEvent::Line(line) => self.log.push(line),
                TaskEvent::Finished { task, ok: true } => {
                    self.log.push(String::new());
                    if task.changes_data() {
                        if let Err(err) = self.reload_all() {
                            self.mode = Mode::Message(MessageDialog::error(err.user_message()));
                            continue;
                        }
                    }
                    self.set_status(format!("{} finished.", task.label()), StatusKind::Info);
                }
                TaskEvent::Finished { task, ok: false } => {
                    self.log.push(String::new());
                    let text = format!("{} failed. See the Log tab for details.", task.label());
                    self.set_status(text.clone(), StatusKind::Error);
                    self.mode = Mode::Message(MessageDialog::error(text));
                }
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Searching { previous } => self.handle_search(code, previous),
            Mode::Editing => self.handle_editing(code),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::ConfirmReset => self.handle_confirm_reset(code),
            Mode::Message(_) => Mode::Normal,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Tab => {
                self.switch_screen(1);
                return Mode::Normal;
            }
            KeyCode::BackTab => {
                self.switch_screen(-1);
                return Mode::Normal;
            }
            KeyCode::Char('t') => {
                self.theme.dark = !self.theme.dark;
                return Mode::Normal;
            }
            KeyCode::Char('I') => return Mode::ConfirmReset,
            KeyCode::Char('S') => {
                self.start_task(TaskKind::Seed);
                return Mode::Normal;
            }
            KeyCode::Char('p') => {
                self.start_task(TaskKind::TopDrugs {
                    window_days: self.top_drugs_window_days,
                    top_n: self.top_drugs_count,
                });
                return Mode::Normal;
            }
            KeyCode::Char('b') => {
                self.start_task(TaskKind::Underbilled {
                    threshold: self.underbilled_threshold,
                });
                return Mode::Normal;
            }
            _ => {}
        }

        match self.screen {
            Screen::Records(index) => self.handle_records_key(code, index),
            Screen::Log => {
                self.handle_log_key(code);
                Mode::Normal
            }
        }
    }

    fn handle_records_key(&mut self, code: KeyCode, index: usize) -> Mode {
        let today = self.clock.today();
        let tab = &mut self.tabs[index];
        match code {
            KeyCode::Up => tab.move_selection(-1),
            KeyCode::Down => tab.move_selection(1),
            KeyCode::PageUp => tab.move_selection(-PAGE_STEP),
            KeyCode::PageDown => tab.move_selection(PAGE_STEP),
            KeyCode::Home => tab.select_first(),
            KeyCode::End => tab.select_last(),
            KeyCode::Left => tab.move_sort_cursor(-1),
            KeyCode::Right => tab.move_sort_cursor(1),
            KeyCode::Char('s') => {
                let column = tab.sort_cursor();
                if let Err(err) = tab.sort_by(&self.conn, column) {
                    return self.fail(err);
                }
            }
            KeyCode::Char('f') => {
                return Mode::Searching {
                    previous: tab.filter().to_string(),
                };
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                tab.form.error = None;
                return Mode::Editing;
            }
            KeyCode::Char('c') => tab.clear_form(),
            KeyCode::Char('r') => {
                let title = tab.title();
                match tab.refresh(&self.conn) {
                    Ok(()) => self.set_status(format!("Reloaded {title}."), StatusKind::Info),
                    Err(err) => return self.fail(err),
                }
            }
            KeyCode::Char('+') => {
                let result = tab.add(&self.conn, today);
                return self.report(index, result);
            }
            KeyCode::Char('e') => {
                let result = tab.update(&self.conn, today);
                return self.report(index, result);
            }
            KeyCode::Char('-') => match tab.request_delete() {
                Some(pending) => {
                    return Mode::ConfirmDelete(ConfirmDelete {
                        tab: index,
                        pending,
                    })
                }
                None => self.set_status("Select a row first.", StatusKind::Info),
            },
            _ => {}
        }
        Mode::Normal
    }

    fn handle_log_key(&mut self, code: KeyCode) {
        let max = self.log.len();
        match code {
            KeyCode::Up => self.log_offset = (self.log_offset + 1).min(max),
            KeyCode::Down => self.log_offset = self.log_offset.saturating_sub(1),
            KeyCode::PageUp => self.log_offset = (self.log_offset + PAGE_STEP as usize).min(max),
            KeyCode::PageDown => {
                self.log_offset = self.log_offset.saturating_sub(PAGE_STEP as usize)
            }
            KeyCode::Home => self.log_offset = max,
            KeyCode::End => self.log_offset = 0,
            KeyCode::Char('c') => {
                self.log.clear();
                self.log_offset = 0;
            }
            _ => {}
        }
    }

    fn handle_search(&mut self, code: KeyCode, previous: String) -> Mode {
        let Screen::Records(index) = self.screen else {
            return Mode::Normal;
        };
        let mut query = self.tabs[index].filter().to_string();
        match code {
            KeyCode::Esc => {
                return match self.tabs[index].set_filter(&self.conn, previous) {
                    Ok(()) => Mode::Normal,
                    Err(err) => self.fail(err),
                };
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => query.push(ch),
            _ => return Mode::Searching { previous },
        }

        match self.tabs[index].set_filter(&self.conn, query) {
            Ok(()) => Mode::Searching { previous },
            Err(err) => self.fail(err),
        }
    }

    fn handle_editing(&mut self, code: KeyCode) -> Mode {
        let Screen::Records(index) = self.screen else {
            return Mode::Normal;
        };
        let form = &mut self.tabs[index].form;
        match code {
            KeyCode::Esc | KeyCode::Enter => return Mode::Normal,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Editing
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self.tabs[confirm.tab].confirm_delete(&self.conn, &confirm.pending);
                self.report(confirm.tab, result)
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_confirm_reset(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.start_task(TaskKind::ResetSchema);
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Reset cancelled.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmReset,
        }
    }

    fn switch_screen(&mut self, delta: isize) {
        let count = self.tabs.len() as isize + 1;
        let current = match self.screen {
            Screen::Records(index) => index as isize,
            Screen::Log => self.tabs.len() as isize,
        };
        let next = (current + delta).rem_euclid(count) as usize;
        self.screen = if next == self.tabs.len() {
            Screen::Log
        } else {
            Screen::Records(next)
        };
    }

    fn start_task(&mut self, task: TaskKind) {
        match self.tasks.start(task) {
            Ok(()) => {
                self.log.push(format!("▶ {}", task.label()));
                self.log_offset = 0;
                if !task.changes_data() {
                    self.screen = Screen::Log;
                }
                self.set_status(format!("{} running...", task.label()), StatusKind::Info);
            }
            Err(busy) => self.set_status(
                format!("{} is still running.", busy.running.label()),
                StatusKind::Error,
            ),
        }
    }

    fn reload_all(&mut self) -> crate::error::Result<()> {
        for tab in &mut self.tabs {
            tab.refresh(&self.conn)?;
        }
        info!(tabs = self.tabs.len(), "all tabs reloaded");
        Ok(())
    }

    /// Turn a CRUD result into a status line, or an error dialog on failure.
    fn report(&mut self, index: usize, result: crate::error::Result<CrudOutcome>) -> Mode {
        let entity = self.tabs[index].entity_name();
        match result {
            Ok(CrudOutcome::Added(id)) => {
                self.set_status(format!("Added {entity} #{id}."), StatusKind::Info)
            }
            Ok(CrudOutcome::Updated(id)) => {
                self.set_status(format!("Updated {entity} #{id}."), StatusKind::Info)
            }
            Ok(CrudOutcome::Deleted { id, removed: true }) => {
                self.set_status(format!("Deleted {entity} #{id}."), StatusKind::Info)
            }
            Ok(CrudOutcome::Deleted { id, removed: false }) => self.set_status(
                format!("{entity} #{id} was already gone."),
                StatusKind::Info,
            ),
            Ok(CrudOutcome::NoSelection) => self.set_status("Select a row first.", StatusKind::Info),
            Err(err) => {
                self.tabs[index].form.error = Some(err.user_message());
                return self.fail(err);
            }
        }
        Mode::Normal
    }

    fn fail(&mut self, err: ClinicError) -> Mode {
        let message = err.user_message();
        self.set_status(message.clone(), StatusKind::Error);
        Mode::Message(MessageDialog::error(message))
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(self.theme.base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Length(SEARCH_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tab_bar(frame, chunks[0]);
        match self.screen {
            Screen::Records(index) => {
                let tab = &self.tabs[index];
                self.draw_search_bar(frame, chunks[1], tab);
                let body = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                    .split(chunks[2]);
                self.draw_table(frame, body[0], tab);
                self.draw_form(frame, body[1], tab);
            }
            Screen::Log => {
                let log_area = Rect {
                    height: chunks[1].height + chunks[2].height,
                    ..chunks[1]
                };
                self.draw_log(frame, log_area);
            }
        }
        self.draw_footer(frame, chunks[3]);

        match &self.mode {
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmReset => self.draw_confirm_reset(frame, area),
            Mode::Message(dialog) => self.draw_message(frame, area, dialog),
            Mode::Normal | Mode::Searching { .. } | Mode::Editing => {}
        }
    }

    fn draw_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<String> = self
            .tabs
            .iter()
            .map(|tab| tab.title().to_string())
            .chain(std::iter::once(LOG_TITLE.to_string()))
            .collect();
        let selected = match self.screen {
            Screen::Records(index) => index,
            Screen::Log => self.tabs.len(),
        };

        let tabs = Tabs::new(titles)
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" 🐾 Veterinary Clinic "),
            )
            .style(self.theme.base())
            .highlight_style(self.theme.selected());
        frame.render_widget(tabs, area);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, tab: &CrudTab) {
        let searching = matches!(self.mode, Mode::Searching { .. });
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(if searching {
                Style::default().fg(Color::Yellow)
            } else {
                self.theme.muted()
            });
        let text = if tab.filter().is_empty() && !searching {
            Span::styled("Press f to filter", self.theme.muted())
        } else {
            Span::raw(format!("Filter: {}", tab.filter()))
        };
        let paragraph = Paragraph::new(text).block(block.clone());
        frame.render_widget(paragraph, area);

        if searching {
            let inner = block.inner(area);
            let cursor_x = inner.x + "Filter: ".len() as u16 + tab.filter().chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, tab: &CrudTab) {
        let columns = tab.columns();
        let sort = tab.sort();
        let header_cells = columns.iter().enumerate().map(|(index, column)| {
            let direction = sort
                .filter(|state| state.column == index)
                .map(|state| state.descending);
            let style = if index == tab.sort_cursor() {
                self.theme.sort_cursor()
            } else {
                self.theme.header()
            };
            Cell::from(Span::styled(heading_label(column.heading, direction), style))
        });
        let header = TableRow::new(header_cells).height(1);

        let rows = tab.rows().iter().enumerate().map(|(index, row)| {
            TableRow::new(row.cells.iter().cloned().map(Cell::from))
                .style(self.theme.row(RowParity::of(index)))
        });

        let widths = columns.iter().map(|column| match column.kind {
            ColumnKind::Identifier => Constraint::Length(6),
            ColumnKind::Editable | ColumnKind::Derived => Constraint::Fill(1),
        });

        let title = format!(
            " {} ({} of {}) ",
            tab.title(),
            tab.rows().len(),
            tab.total_rows()
        );
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(self.theme.selected());

        let mut state = TableState::default().with_selected(tab.selected_index());
        frame.render_stateful_widget(table, area, &mut state);

        if tab.rows().is_empty() {
            let inner = Block::default().borders(Borders::ALL).inner(area);
            let empty = Rect {
                y: inner.y + 1,
                height: inner.height.saturating_sub(1),
                ..inner
            };
            let message = if tab.total_rows() == 0 {
                "No records yet. Fill the form and press + to add one."
            } else {
                "No rows match the filter."
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, self.theme.muted()))
                    .alignment(Alignment::Center),
                empty,
            );
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, tab: &CrudTab) {
        let editing = matches!(self.mode, Mode::Editing);
        let title = match tab.selected_row() {
            Some(row) => format!(" {} #{} ", tab.entity_name(), row.id),
            None => format!(" New {} ", tab.entity_name()),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(if editing {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = form_lines(&tab.form, editing);
        lines.push(Line::from(""));
        if let Some(error) = &tab.form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else if editing {
            lines.push(Line::from(Span::styled(
                "Tab/↑↓ to move • Enter or Esc when done",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

        if editing {
            if let Some((dx, dy)) = cursor_offset(&tab.form) {
                let x = (inner.x + dx).min(inner.right().saturating_sub(1));
                frame.set_cursor_position((x, inner.y + dy));
            }
        }
    }

    fn draw_log(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Log ");
        let height = block.inner(area).height as usize;
        let top = self
            .log
            .len()
            .saturating_sub(height)
            .saturating_sub(self.log_offset);

        let lines: Vec<Line> = if self.log.is_empty() {
            vec![Line::from(Span::styled(
                "Analytics and background task output appears here.",
                self.theme.muted(),
            ))]
        } else {
            self.log
                .iter()
                .map(|line| Line::from(line.as_str()))
                .collect()
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((top as u16, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else if let Some(task) = self.tasks.running() {
            Line::from(Span::styled(
                format!("{} running...", task.label()),
                self.theme.muted(),
            ))
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Searching { .. }) => &[("[Enter]", "Keep"), ("[Esc]", "Restore")],
            (_, Mode::Editing) => &[
                ("[Tab]", "Next"),
                ("[S-Tab]", "Previous"),
                ("[Enter/Esc]", "Done"),
            ],
            (_, Mode::ConfirmDelete(_) | Mode::ConfirmReset) => {
                &[("[Y]", "Confirm"), ("[N/Esc]", "Cancel")]
            }
            (_, Mode::Message(_)) => &[("[any key]", "Dismiss")],
            (Screen::Log, Mode::Normal) => &[
                ("[Tab]", "Switch"),
                ("[↑↓]", "Scroll"),
                ("[c]", "Clear"),
                ("[p]", "Top drugs"),
                ("[b]", "Underbilled"),
                ("[q]", "Quit"),
            ],
            (Screen::Records(_), Mode::Normal) => &[
                ("[Tab]", "Switch"),
                ("[f]", "Filter"),
                ("[←→ s]", "Sort"),
                ("[i]", "Edit"),
                ("[+]", "Add"),
                ("[e]", "Update"),
                ("[-]", "Delete"),
                ("[c]", "Clear"),
                ("[r]", "Refresh"),
                ("[S]", "Seed"),
                ("[I]", "Reset"),
                ("[p/b]", "Analytics"),
                ("[t]", "Theme"),
                ("[q]", "Quit"),
            ],
        };

        let key_style = self.theme.key();
        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(format!(" {action}   ")),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let lines = vec![
            Line::from(format!("Delete {}?", confirm.pending.summary)),
            Line::from("Records that reference it are left in place."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        draw_dialog(frame, area, "Confirm Delete", lines, Style::default());
    }

    fn draw_confirm_reset(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Drop and recreate every table?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("All clinic records will be lost."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        draw_dialog(frame, area, "Reset Database", lines, Style::default());
    }

    fn draw_message(&self, frame: &mut Frame, area: Rect, dialog: &MessageDialog) {
        let lines = vec![
            Line::from(Span::styled(dialog.text.clone(), dialog.kind.style())),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to continue.",
                Style::default().fg(Color::Gray),
            )),
        ];
        draw_dialog(frame, area, dialog.title, lines, dialog.kind.style());
    }
}

fn draw_dialog(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>, border: Style) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(border);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::clock::FixedClock;
    use crate::db::{count_rows, open_in_memory};

    fn app(dir: &tempfile::TempDir) -> App {
        let config = Config::with_data_dir(dir.path());
        let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
        App::new(open_in_memory().unwrap(), &config, Arc::new(clock)).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    /// Fill the patient form (name, species) and save it.
    fn add_patient(app: &mut App, name: &str, species: &str) {
        app.handle_key(KeyCode::Char('i')).unwrap();
        type_text(app, name);
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(app, species);
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
    }

    #[test]
    fn tab_key_cycles_through_log_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert_eq!(app.screen, Screen::Records(0));
        app.handle_key(KeyCode::BackTab).unwrap();
        assert_eq!(app.screen, Screen::Log);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.screen, Screen::Records(0));
    }

    #[test]
    fn form_keys_add_a_patient() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.handle_key(KeyCode::Tab).unwrap();
        add_patient(&mut app, "Rex", "Dog");

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(count_rows(&app.conn, "patients").unwrap(), 1);
        assert_eq!(app.tabs[1].rows()[0].cells[1], "Rex");
        assert_eq!(app.status.as_ref().unwrap().text, "Added Patient #1.");
    }

    #[test]
    fn invalid_input_opens_an_error_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('i')).unwrap();
        type_text(&mut app, "Gauze");
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "lots");
        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();

        assert!(matches!(app.mode, Mode::Message(_)));
        assert!(app.tabs[2].form.error.is_some());
        assert_eq!(app.tabs[2].form.get("quantity"), "lots");
        assert!(app.tabs[2].rows().is_empty());

        app.handle_key(KeyCode::Char('x')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn delete_waits_for_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.handle_key(KeyCode::Tab).unwrap();
        add_patient(&mut app, "Rex", "Dog");

        app.handle_key(KeyCode::Char('-')).unwrap();
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.text, "Select a row first.");
        assert_eq!(status.kind, StatusKind::Info);
        assert!(matches!(app.mode, Mode::Normal));

        app.handle_key(KeyCode::Char('e')).unwrap();
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Info);

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Char('-')).unwrap();
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.tabs[1].rows().len(), 1);

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(app.tabs[1].rows().is_empty());
    }

    #[test]
    fn search_filters_live_and_esc_restores() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.handle_key(KeyCode::Tab).unwrap();
        add_patient(&mut app, "Rex", "Dog");
        add_patient(&mut app, "Milo", "Cat");

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "mi");
        assert_eq!(app.tabs[1].rows().len(), 1);
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.tabs[1].filter(), "");
        assert_eq!(app.tabs[1].rows().len(), 2);
    }

    #[test]
    fn quit_key_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(!app.handle_key(KeyCode::Char('t')).unwrap());
        assert!(app.theme.dark);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
