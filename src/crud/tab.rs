use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

use super::{filter_and_sort, Column, EntityTable, RecordForm, Row, SortState};

/// What a CRUD action did, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrudOutcome {
    Added(i64),
    Updated(i64),
    Deleted { id: i64, removed: bool },
    /// Update or delete was asked for with no row selected. Nothing changed.
    NoSelection,
}

/// A delete awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: i64,
    pub summary: String,
}

/// State of one entity tab: the fetched rows, the filtered and sorted view of
/// them, the selection and the details form.
pub struct CrudTab {
    table: Box<dyn EntityTable>,
    records: Vec<Row>,
    visible: Vec<Row>,
    filter: String,
    sort: Option<SortState>,
    sort_cursor: usize,
    selected: Option<usize>,
    pub form: RecordForm,
}

impl CrudTab {
    pub fn new(table: Box<dyn EntityTable>) -> Self {
        let form = RecordForm::for_columns(table.columns());
        Self {
            table,
            records: Vec::new(),
            visible: Vec::new(),
            filter: String::new(),
            sort: None,
            sort_cursor: 0,
            selected: None,
            form,
        }
    }

    pub fn title(&self) -> &'static str {
        self.table.title()
    }

    pub fn entity_name(&self) -> &'static str {
        self.table.entity_name()
    }

    pub fn columns(&self) -> &'static [Column] {
        self.table.columns()
    }

    /// Rows currently displayed, after filter and sort.
    pub fn rows(&self) -> &[Row] {
        &self.visible
    }

    pub fn total_rows(&self) -> usize {
        self.records.len()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn sort_cursor(&self) -> usize {
        self.sort_cursor
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.selected.and_then(|index| self.visible.get(index))
    }

    /// Re-fetch from the store and rebuild the view. Clears the selection and
    /// the form.
    pub fn refresh(&mut self, conn: &Connection) -> Result<()> {
        self.records = self.table.list(conn)?;
        self.rebuild();
        self.selected = None;
        self.form.clear();
        debug!(
            tab = self.title(),
            fetched = self.records.len(),
            shown = self.visible.len(),
            "tab refreshed"
        );
        Ok(())
    }

    fn rebuild(&mut self) {
        self.visible = filter_and_sort(self.records.clone(), &self.filter, self.sort);
    }

    /// Replace the filter text and refresh.
    pub fn set_filter(&mut self, conn: &Connection, filter: impl Into<String>) -> Result<()> {
        self.filter = filter.into();
        self.refresh(conn)
    }

    /// Sort by `column`, flipping direction when it is already the sort column.
    pub fn sort_by(&mut self, conn: &Connection, column: usize) -> Result<()> {
        if column >= self.columns().len() {
            return Ok(());
        }
        self.sort = Some(SortState::toggled(self.sort, column));
        self.sort_cursor = column;
        self.refresh(conn)
    }

    /// Move the column highlighted for sorting, wrapping at both ends.
    pub fn move_sort_cursor(&mut self, delta: isize) {
        let len = self.columns().len() as isize;
        if len > 0 {
            self.sort_cursor = (self.sort_cursor as isize + delta).rem_euclid(len) as usize;
        }
    }

    /// Select a displayed row and copy its editable cells into the form.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(row) = self.visible.get(index) else {
            return false;
        };
        self.form.fill_from_row(self.table.columns(), row);
        self.selected = Some(index);
        true
    }

    pub fn select_id(&mut self, id: i64) -> bool {
        match self.visible.iter().position(|row| row.id == id) {
            Some(index) => self.select(index),
            None => false,
        }
    }

    /// Move the selection by `offset`, clamped to the visible rows. With no
    /// selection the first row is chosen.
    pub fn move_selection(&mut self, offset: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() as isize - 1;
        let next = match self.selected {
            Some(current) => (current as isize + offset).clamp(0, last),
            None => 0,
        };
        self.select(next as usize);
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.visible.len().checked_sub(1) {
            self.select(last);
        }
    }

    pub fn clear_form(&mut self) {
        self.form.clear();
    }

    /// Insert from the form. On failure nothing changes, so the user keeps
    /// their input.
    pub fn add(&mut self, conn: &Connection, today: NaiveDate) -> Result<CrudOutcome> {
        let id = self.table.insert(conn, &self.form, today)?;
        self.refresh(conn)?;
        Ok(CrudOutcome::Added(id))
    }

    /// Overwrite the selected record with the form. The updated row stays
    /// selected when it is still visible.
    pub fn update(&mut self, conn: &Connection, today: NaiveDate) -> Result<CrudOutcome> {
        let Some(id) = self.selected_row().map(|row| row.id) else {
            return Ok(CrudOutcome::NoSelection);
        };
        self.table.update(conn, id, &self.form, today)?;
        self.refresh(conn)?;
        self.select_id(id);
        Ok(CrudOutcome::Updated(id))
    }

    /// First half of a delete: describe the selected row for a confirmation.
    pub fn request_delete(&self) -> Option<PendingDelete> {
        let row = self.selected_row()?;
        let label = row.cells.get(1).map(String::as_str).unwrap_or_default();
        Some(PendingDelete {
            id: row.id,
            summary: format!("{} #{} ({label})", self.entity_name(), row.id),
        })
    }

    pub fn confirm_delete(
        &mut self,
        conn: &Connection,
        pending: &PendingDelete,
    ) -> Result<CrudOutcome> {
        let removed = self.table.delete(conn, pending.id)?;
        self.refresh(conn)?;
        Ok(CrudOutcome::Deleted {
            id: pending.id,
            removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;

    use crate::crud::tables::{TableOf, Tabular};
    use crate::db::{open_in_memory, Entity};
    use crate::error::ClinicError;
    use crate::models::{Appointment, Bill, Doctor, InventoryItem, Patient, Prescription};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn patients_tab(conn: &Connection) -> CrudTab {
        let mut tab = CrudTab::new(Box::new(TableOf::<Patient>::new()));
        for (name, species) in [("Rex", "Dog"), ("Milo", "Cat"), ("Bella", "Dog")] {
            tab.form.set("name", name);
            tab.form.set("species", species);
            tab.add(conn, today()).unwrap();
        }
        tab
    }

    #[test]
    fn add_refreshes_and_clears_the_form() {
        let conn = open_in_memory().unwrap();
        let tab = patients_tab(&conn);
        assert_eq!(tab.rows().len(), 3);
        assert_eq!(tab.form.get("name"), "");
        assert_eq!(tab.selected_index(), None);
    }

    #[test]
    fn filter_keeps_matching_rows() {
        let conn = open_in_memory().unwrap();
        let mut tab = patients_tab(&conn);
        tab.set_filter(&conn, "re").unwrap();
        let names: Vec<&str> = tab.rows().iter().map(|r| r.cells[1].as_str()).collect();
        assert_eq!(names, vec!["Rex"]);
        assert_eq!(tab.total_rows(), 3);
    }

    #[test]
    fn sorting_same_column_twice_reverses() {
        let conn = open_in_memory().unwrap();
        let mut tab = patients_tab(&conn);
        tab.sort_by(&conn, 1).unwrap();
        let names: Vec<&str> = tab.rows().iter().map(|r| r.cells[1].as_str()).collect();
        assert_eq!(names, vec!["Bella", "Milo", "Rex"]);

        tab.sort_by(&conn, 1).unwrap();
        let names: Vec<&str> = tab.rows().iter().map(|r| r.cells[1].as_str()).collect();
        assert_eq!(names, vec!["Rex", "Milo", "Bella"]);
    }

    #[test]
    fn selecting_copies_values_but_not_the_id() {
        let conn = open_in_memory().unwrap();
        let mut tab = patients_tab(&conn);
        assert!(tab.select(1));
        assert_eq!(tab.form.get("name"), "Milo");
        assert_eq!(tab.form.get("species"), "Cat");
        assert!(tab.form.fields().iter().all(|f| f.key != "id"));
        assert!(!tab.select(10));
    }

    #[test]
    fn update_and_delete_need_a_selection() {
        let conn = open_in_memory().unwrap();
        let mut tab = patients_tab(&conn);
        assert_eq!(tab.update(&conn, today()).unwrap(), CrudOutcome::NoSelection);
        assert_eq!(tab.request_delete(), None);
        assert_eq!(tab.rows().len(), 3);
    }

    #[test]
    fn update_keeps_the_row_selected() {
        let conn = open_in_memory().unwrap();
        let mut tab = patients_tab(&conn);
        tab.select(0);
        let id = tab.selected_row().unwrap().id;
        tab.form.set("breed", "Beagle");
        assert_eq!(tab.update(&conn, today()).unwrap(), CrudOutcome::Updated(id));
        assert_eq!(tab.selected_row().map(|r| r.id), Some(id));
        assert_eq!(tab.form.get("breed"), "Beagle");
    }

    #[test]
    fn confirmed_delete_removes_the_row() {
        let conn = open_in_memory().unwrap();
        let mut tab = patients_tab(&conn);
        tab.select(2);
        let pending = tab.request_delete().unwrap();
        assert!(pending.summary.starts_with("Patient #"));
        let outcome = tab.confirm_delete(&conn, &pending).unwrap();
        assert_eq!(
            outcome,
            CrudOutcome::Deleted {
                id: pending.id,
                removed: true
            }
        );
        assert_eq!(tab.rows().len(), 2);
        assert!(tab.rows().iter().all(|row| row.id != pending.id));
    }

    #[test]
    fn failed_add_leaves_everything_in_place() {
        let conn = open_in_memory().unwrap();
        let mut tab = CrudTab::new(Box::new(TableOf::<InventoryItem>::new()));
        tab.refresh(&conn).unwrap();
        tab.form.set("item_name", "Gauze");
        tab.form.set("quantity", "lots");
        tab.form.set("unit_price", "2.50");
        tab.form.set("expiry_date", "2027-01-01");

        let err = tab.add(&conn, today()).unwrap_err();
        assert!(matches!(err, ClinicError::Validation { .. }));
        assert!(tab.rows().is_empty());
        assert_eq!(tab.form.get("item_name"), "Gauze");
        assert_eq!(tab.form.get("quantity"), "lots");
    }

    #[test]
    fn selection_moves_within_bounds() {
        let conn = open_in_memory().unwrap();
        let mut tab = patients_tab(&conn);
        tab.move_selection(1);
        assert_eq!(tab.selected_index(), Some(0));
        tab.move_selection(10);
        assert_eq!(tab.selected_index(), Some(2));
        tab.move_selection(-1);
        assert_eq!(tab.selected_index(), Some(1));
        tab.move_sort_cursor(-1);
        assert_eq!(tab.sort_cursor(), tab.columns().len() - 1);
    }

    fn stored<E: Entity>(conn: &Connection, id: i64) -> E {
        E::list(conn)
            .unwrap()
            .into_iter()
            .find(|record| record.id() == id)
            .unwrap()
    }

    /// Add a record through the tab, change one form field, update, and check
    /// that the stored record differs only by `expect`.
    fn update_one_field<E>(
        fields: &[(&str, &str)],
        key: &str,
        value: &str,
        expect: impl FnOnce(&mut E),
    ) where
        E: Tabular + Clone + Debug + PartialEq,
    {
        let conn = open_in_memory().unwrap();
        let mut tab = CrudTab::new(Box::new(TableOf::<E>::new()));
        tab.refresh(&conn).unwrap();
        for (field, text) in fields {
            assert!(tab.form.set(field, *text), "no field {field}");
        }
        let CrudOutcome::Added(id) = tab.add(&conn, today()).unwrap() else {
            panic!("add did not insert");
        };
        let before: E = stored(&conn, id);

        assert!(tab.select_id(id));
        assert!(tab.form.set(key, value));
        assert_eq!(tab.update(&conn, today()).unwrap(), CrudOutcome::Updated(id));

        let mut expected = before;
        expect(&mut expected);
        assert_eq!(stored::<E>(&conn, id), expected, "{} update of {key}", E::NAME);
    }

    #[test]
    fn doctor_update_changes_only_the_edited_field() {
        update_one_field::<Doctor>(
            &[
                ("vcn", "VCN200001"),
                ("name", "Dr. Ada Moss"),
                ("phone", "555-0100"),
                ("email", "ada@vetclinic.com"),
                ("graduated_year", "2004"),
            ],
            "phone",
            "555-0199",
            |doctor| doctor.phone = "555-0199".into(),
        );
    }

    #[test]
    fn patient_update_changes_only_the_edited_field() {
        update_one_field::<Patient>(
            &[
                ("name", "Rex"),
                ("species", "Dog"),
                ("breed", "Beagle"),
                ("owner_name", "Ann Lee"),
                ("owner_contact", "555-0111"),
            ],
            "breed",
            "Bulldog",
            |patient| patient.breed = "Bulldog".into(),
        );
    }

    #[test]
    fn inventory_update_keeps_unrounded_price() {
        update_one_field::<InventoryItem>(
            &[
                ("item_name", "Amoxicillin 250mg"),
                ("description", "Antibiotic capsules"),
                ("quantity", "5"),
                ("unit_price", "14.999"),
                ("expiry_date", "2027-01-31"),
            ],
            "quantity",
            "6",
            |item| {
                assert_eq!(item.unit_price, 14.999);
                item.quantity = 6;
            },
        );
    }

    #[test]
    fn prescription_update_changes_only_the_edited_field() {
        update_one_field::<Prescription>(
            &[
                ("patient", "1"),
                ("doctor", "2"),
                ("date", "2026-03-01"),
                ("diagnosis", "Otitis externa"),
                ("medication", "Amoxicillin 250mg"),
                ("dosage", "1 capsule twice daily"),
                ("instructions", "Give with food"),
            ],
            "dosage",
            "1 capsule daily",
            |rx| rx.dosage = "1 capsule daily".into(),
        );
    }

    #[test]
    fn bill_update_keeps_unrounded_amounts() {
        update_one_field::<Bill>(
            &[
                ("prescription_id", "1"),
                ("total_amount", "123.456"),
                ("paid_amount", "61.005"),
                ("billing_date", "2026-03-02"),
            ],
            "billing_date",
            "2026-03-09",
            |bill| {
                assert_eq!(bill.total_amount, 123.456);
                assert_eq!(bill.paid_amount, 61.005);
                bill.billing_date = "2026-03-09".into();
            },
        );
    }

    #[test]
    fn appointment_update_changes_only_the_edited_field() {
        update_one_field::<Appointment>(
            &[
                ("patient", "1"),
                ("doctor", "2"),
                ("date", "2026-10-20"),
                ("time", "09:30"),
                ("reason", "Vaccination"),
                ("status", "Completed"),
            ],
            "reason",
            "Booster shot",
            |appt| appt.reason = "Booster shot".into(),
        );
    }
}
