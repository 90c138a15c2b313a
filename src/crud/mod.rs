//! Entity-agnostic CRUD tab core. Every entity screen (in the terminal UI and
//! the menu shell alike) is a [`CrudTab`] over an [`EntityTable`]; the only
//! per-entity code lives in [`tables`].

mod form;
mod tab;
pub mod tables;
mod view;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::Result;

pub use form::{FormField, RecordForm};
pub use tab::{CrudOutcome, CrudTab, PendingDelete};
pub use tables::clinic_tables;
pub use view::{filter_and_sort, RowParity, SortState};

pub(crate) use form::{reference_cell, FieldCheck};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// The primary key. Shown, never edited.
    Identifier,
    /// Has a form input.
    Editable,
    /// Resolved from another table for display only.
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub heading: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn identifier(key: &'static str, heading: &'static str) -> Self {
        Self {
            key,
            heading,
            kind: ColumnKind::Identifier,
        }
    }

    pub const fn editable(key: &'static str, heading: &'static str) -> Self {
        Self {
            key,
            heading,
            kind: ColumnKind::Editable,
        }
    }

    pub const fn derived(key: &'static str, heading: &'static str) -> Self {
        Self {
            key,
            heading,
            kind: ColumnKind::Derived,
        }
    }
}

/// One displayed row: the record id plus one cell per column, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub cells: Vec<String>,
}

/// Object-safe view of an entity as a table of strings. Implemented
/// generically for every [`tables::Tabular`] record type.
pub trait EntityTable {
    fn title(&self) -> &'static str;

    /// Singular name used in messages.
    fn entity_name(&self) -> &'static str;

    fn columns(&self) -> &'static [Column];

    fn list(&self, conn: &Connection) -> Result<Vec<Row>>;

    /// Validate the form and insert. `today` fills blank date fields that
    /// default to the current day.
    fn insert(&self, conn: &Connection, form: &RecordForm, today: NaiveDate) -> Result<i64>;

    fn update(&self, conn: &Connection, id: i64, form: &RecordForm, today: NaiveDate)
        -> Result<()>;

    fn delete(&self, conn: &Connection, id: i64) -> Result<bool>;
}
