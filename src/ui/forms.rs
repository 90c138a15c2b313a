use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::crud::{PendingDelete, RecordForm};

use super::helpers::StatusKind;

/// Width reserved for field labels so the inputs line up.
pub(crate) const LABEL_WIDTH: usize = 16;

/// Render every field of the details form, highlighting the focused one when
/// the form has keyboard focus.
pub(crate) fn form_lines(form: &RecordForm, focused: bool) -> Vec<Line<'static>> {
    form.fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let is_active = focused && index == form.active();
            let display = if field.value.is_empty() {
                "<blank>".to_string()
            } else {
                field.value.clone()
            };

            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else if field.value.is_empty() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            Line::from(vec![
                Span::raw(format!("{:<width$} ", field.label, width = LABEL_WIDTH)),
                Span::styled(display, style),
            ])
        })
        .collect()
}

/// Cursor column and row offsets of the focused input, relative to the panel.
pub(crate) fn cursor_offset(form: &RecordForm) -> Option<(u16, u16)> {
    let field = form.active_field()?;
    let x = LABEL_WIDTH + 1 + field.value.chars().count();
    Some((x as u16, form.active() as u16))
}

/// A modal message dismissed with any key.
#[derive(Debug, Clone)]
pub(crate) struct MessageDialog {
    pub(crate) title: &'static str,
    pub(crate) text: String,
    pub(crate) kind: StatusKind,
}

impl MessageDialog {
    pub(crate) fn error(text: impl Into<String>) -> Self {
        Self {
            title: "Error",
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

/// Delete awaiting a Y/N answer.
#[derive(Debug, Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) tab: usize,
    pub(crate) pending: PendingDelete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::Column;

    #[test]
    fn cursor_follows_the_focused_value() {
        let columns = [Column::editable("name", "Name"), Column::editable("species", "Species")];
        let mut form = RecordForm::for_columns(&columns);
        form.next_field();
        form.push_char('C');
        form.push_char('a');
        assert_eq!(cursor_offset(&form), Some((LABEL_WIDTH as u16 + 3, 1)));
        assert_eq!(form_lines(&form, true).len(), 2);
    }
}
