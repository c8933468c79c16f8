use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::editor::SubmitInput;
use crate::models::Record;

/// Internal representation of the record form fields.
#[derive(Default, Clone)]
pub(crate) struct RecordForm {
    pub(crate) date: String,
    pub(crate) client: String,
    pub(crate) ddt: String,
    pub(crate) amount: String,
    pub(crate) active: RecordField,
    pub(crate) error: Option<String>,
}

/// Fields available within the record form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum RecordField {
    Date,
    Client,
    Ddt,
    Amount,
}

impl Default for RecordField {
    fn default() -> Self {
        RecordField::Date
    }
}

impl RecordForm {
    /// Start a blank form, pre-filling the date with the last-used value so
    /// entering several documents for the same day stays fast.
    pub(crate) fn with_date(date: String) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    /// Populate the form for editing an existing row.
    ///
    /// Only client, DDT and amount come from the record; the date keeps
    /// whatever the form last held. The original editor behaved exactly this
    /// way, and users rely on it when re-dating a document during an edit.
    pub(crate) fn for_edit(date: String, record: &Record) -> Self {
        Self {
            date,
            client: record.client.clone(),
            ddt: record.ddt.clone(),
            amount: record.amount.clone(),
            active: RecordField::Client,
            error: None,
        }
    }

    /// Cycle focus across the four fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            RecordField::Date => RecordField::Client,
            RecordField::Client => RecordField::Ddt,
            RecordField::Ddt => RecordField::Amount,
            RecordField::Amount => RecordField::Date,
        };
    }

    /// Append a character to the active field. Control characters are
    /// ignored; anything else is accepted and validated on submit, the same
    /// as the original free-text inputs.
    pub(crate) fn push_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.field_mut().push(ch);
        self.error = None;
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.field_mut().pop();
        self.error = None;
    }

    /// Snapshot the raw field values for the core to validate and persist.
    pub(crate) fn as_input(&self) -> SubmitInput {
        SubmitInput {
            date: self.date.clone(),
            client: self.client.clone(),
            ddt: self.ddt.clone(),
            amount: self.amount.clone(),
        }
    }

    /// Reset everything except the date, which is kept for the next entry.
    pub(crate) fn clear_keeping_date(&mut self) {
        self.client.clear();
        self.ddt.clear();
        self.amount.clear();
        self.active = RecordField::Client;
        self.error = None;
    }

    fn field_mut(&mut self) -> &mut String {
        match self.active {
            RecordField::Date => &mut self.date,
            RecordField::Client => &mut self.client,
            RecordField::Ddt => &mut self.ddt,
            RecordField::Amount => &mut self.amount,
        }
    }

    fn field(&self, field: RecordField) -> &String {
        match field {
            RecordField::Date => &self.date,
            RecordField::Client => &self.client,
            RecordField::Ddt => &self.ddt,
            RecordField::Amount => &self.amount,
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: RecordField) -> Line<'static> {
        let value = self.field(field);
        let is_active = self.active == field;

        let placeholder = match field {
            RecordField::Date => "<YYYY-MM-DD>",
            RecordField::Ddt => "<9 digits>",
            _ => "<required>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character count of the active field, used for cursor placement.
    pub(crate) fn active_len(&self) -> usize {
        self.field(self.active).chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_form_leaves_the_date_alone() {
        let record = Record::new("2023-05-05", "Acme", "123456789", "7.25");
        let form = RecordForm::for_edit("2024-01-01".into(), &record);
        assert_eq!(form.date, "2024-01-01");
        assert_eq!(form.client, "Acme");
        assert_eq!(form.ddt, "123456789");
        assert_eq!(form.amount, "7.25");
    }

    #[test]
    fn clear_keeps_the_date() {
        let mut form = RecordForm::with_date("2024-01-01".into());
        form.active = RecordField::Client;
        form.push_char('A');
        form.clear_keeping_date();
        assert_eq!(form.date, "2024-01-01");
        assert!(form.client.is_empty());
    }

    #[test]
    fn tab_cycles_all_four_fields() {
        let mut form = RecordForm::default();
        assert_eq!(form.active, RecordField::Date);
        form.toggle_field();
        assert_eq!(form.active, RecordField::Client);
        form.toggle_field();
        form.toggle_field();
        form.toggle_field();
        assert_eq!(form.active, RecordField::Date);
    }
}
