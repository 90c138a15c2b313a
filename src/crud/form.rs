use chrono::{NaiveDate, NaiveTime};

use crate::error::{ClinicError, Result};
use crate::models::{AppointmentStatus, DATE_FORMAT, TIME_FORMAT};

use super::{Column, ColumnKind, Row};

/// One editable input in the details form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// The details form bound to a CRUD tab: one text input per editable column,
/// in column order, with a focused field for keyboard entry.
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    fields: Vec<FormField>,
    active: usize,
    pub error: Option<String>,
}

impl RecordForm {
    /// Identifier and derived columns get no input.
    pub fn for_columns(columns: &[Column]) -> Self {
        let fields = columns
            .iter()
            .filter(|column| column.kind == ColumnKind::Editable)
            .map(|column| FormField {
                key: column.key,
                label: column.heading,
                value: String::new(),
            })
            .collect();
        Self {
            fields,
            active: 0,
            error: None,
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_field(&self) -> Option<&FormField> {
        self.fields.get(self.active)
    }

    pub fn focus(&mut self, index: usize) {
        if index < self.fields.len() {
            self.active = index;
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Append to the focused field. Control characters are ignored.
    pub fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.fields.get_mut(self.active) {
            Some(field) => {
                field.value.push(ch);
                self.error = None;
                true
            }
            None => false,
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.pop();
        }
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.active = 0;
        self.error = None;
    }

    /// Set a field by key; returns false when the form has no such field.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|field| field.key == key) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Trimmed value for `key`, empty when absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.trim())
            .unwrap_or("")
    }

    /// Copy a row's displayed cells into the matching inputs.
    pub fn fill_from_row(&mut self, columns: &[Column], row: &Row) {
        for (column, cell) in columns.iter().zip(&row.cells) {
            if column.kind == ColumnKind::Editable {
                self.set(column.key, cell.clone());
            }
        }
        self.error = None;
    }
}

/// Collects every field that fails to parse so one message can name them all.
/// Failed fields yield `Default::default()`; the values must not be used
/// unless [`FieldCheck::finish`] succeeds.
#[derive(Debug, Default)]
pub(crate) struct FieldCheck {
    fields: Vec<&'static str>,
    reasons: Vec<String>,
}

impl FieldCheck {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn fail<T: Default>(&mut self, label: &'static str, reason: String) -> T {
        self.fields.push(label);
        self.reasons.push(reason);
        T::default()
    }

    pub(crate) fn integer(&mut self, label: &'static str, raw: &str) -> i64 {
        match raw.trim().parse::<i64>() {
            Ok(value) => value,
            Err(_) => self.fail(label, format!("{label} must be an integer.")),
        }
    }

    pub(crate) fn count(&mut self, label: &'static str, raw: &str) -> i64 {
        match raw.trim().parse::<i64>() {
            Ok(value) if value >= 0 => value,
            _ => self.fail(label, format!("{label} must be a non-negative integer.")),
        }
    }

    pub(crate) fn decimal(&mut self, label: &'static str, raw: &str) -> f64 {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => self.fail(label, format!("{label} must be a number.")),
        }
    }

    pub(crate) fn price(&mut self, label: &'static str, raw: &str) -> f64 {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => self.fail(label, format!("{label} must be a non-negative number.")),
        }
    }

    pub(crate) fn date(&mut self, label: &'static str, raw: &str) -> NaiveDate {
        match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => self.fail(label, format!("{label} must be a date (YYYY-MM-DD).")),
        }
    }

    /// Empty input means `today`.
    pub(crate) fn date_or(&mut self, label: &'static str, raw: &str, today: NaiveDate) -> NaiveDate {
        if raw.trim().is_empty() {
            today
        } else {
            self.date(label, raw)
        }
    }

    pub(crate) fn time(&mut self, label: &'static str, raw: &str) -> NaiveTime {
        match NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT) {
            Ok(time) => time,
            Err(_) => self.fail(label, format!("{label} must be a time (HH:MM).")),
        }
    }

    /// Accepts `"12"` or the `"12 - Name"` form shown in reference cells.
    pub(crate) fn reference(&mut self, label: &'static str, raw: &str) -> i64 {
        let head = raw.split(" - ").next().unwrap_or("").trim();
        match head.parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => self.fail(label, format!("{label} must be a record id (e.g. 3 or '3 - Name').")),
        }
    }

    /// Empty input means `Scheduled`.
    pub(crate) fn status(&mut self, label: &'static str, raw: &str) -> AppointmentStatus {
        if raw.trim().is_empty() {
            return AppointmentStatus::default();
        }
        match raw.parse::<AppointmentStatus>() {
            Ok(status) => status,
            Err(_) => self.fail(label, format!("{label} must be Scheduled, Completed or Cancelled.")),
        }
    }

    pub(crate) fn finish(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ClinicError::Validation {
                fields: self.fields,
                reason: self.reasons.join(" "),
            })
        }
    }
}

/// Render a reference cell as `"id - name"`, or just the id when the target
/// row is gone.
pub(crate) fn reference_cell(id: i64, name: &str) -> String {
    if name.is_empty() {
        id.to_string()
    } else {
        format!("{id} - {name}")
    }
}
