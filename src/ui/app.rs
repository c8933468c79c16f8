use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::editor::{Ledger, SubmitError, SubmitOutcome};
use crate::models::SortColumn;
use crate::projection::RowHandle;

use super::forms::{RecordField, RecordForm};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 4;

/// Fine-grained modes layered over the single table screen.
enum Mode {
    Normal,
    /// The add/edit form modal. Whether a submit updates or adds is decided
    /// by the ledger's editing state, not by the form itself.
    Form(RecordForm),
    ConfirmClearAll,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    ledger: Ledger,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
    /// Date carried between submissions so repeated entry for the same day
    /// only needs the other three fields. Seeded from the store on startup.
    date_value: String,
}

impl App {
    pub fn new(ledger: Ledger) -> Result<Self> {
        let date_value = ledger.last_date()?.unwrap_or_default();
        Ok(Self {
            ledger,
            selected: 0,
            mode: Mode::Normal,
            status: None,
            date_value,
        })
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Form(form) => self.handle_form(code, form)?,
            Mode::ConfirmClearAll => self.handle_confirm_clear(code)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::Form(RecordForm::with_date(self.date_value.clone())));
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(handle) = self.selected_handle() {
                    self.clear_status();
                    return Ok(self.open_edit_form(handle));
                }
                self.set_status("No row selected.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(handle) = self.selected_handle() {
                    self.ledger.request_delete(handle)?;
                    self.clamp_selection();
                    self.set_status("Record deleted.", StatusKind::Info);
                } else {
                    self.set_status("No row selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if self.ledger.table().is_empty() {
                    self.set_status("Nothing to clear.", StatusKind::Info);
                } else {
                    self.clear_status();
                    return Ok(Mode::ConfirmClearAll);
                }
            }
            KeyCode::Char('1') => self.sort(SortColumn::Date),
            KeyCode::Char('2') => self.sort(SortColumn::Client),
            KeyCode::Char('3') => self.sort(SortColumn::Ddt),
            KeyCode::Char('4') => self.sort(SortColumn::Amount),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_form(&mut self, code: KeyCode, mut form: RecordForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.ledger.cancel_edit();
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let was_editing = self.ledger.is_editing();
                match self.ledger.submit(&form.as_input())? {
                    Ok(outcome) => {
                        // Keep the submitted date for the next entry.
                        self.date_value = form.date.trim().to_string();
                        form.clear_keeping_date();
                        match outcome {
                            SubmitOutcome::Added(_) => {
                                self.selected = self.ledger.table().len().saturating_sub(1);
                                self.set_status("Record added.", StatusKind::Info);
                            }
                            SubmitOutcome::Updated(_) => {
                                self.set_status("Record updated.", StatusKind::Info);
                            }
                        }
                        // After an edit the form closes; after an add it
                        // stays open for the next document.
                        if was_editing {
                            return Ok(Mode::Normal);
                        }
                    }
                    Err(SubmitError::InvalidDdt) => {
                        form.error = Some(SubmitError::InvalidDdt.to_string());
                    }
                    // The original form ignored incomplete input without a
                    // message. Keep that: the user just stays in the form.
                    Err(SubmitError::IncompleteInput) => {}
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Form(form))
    }

    fn handle_confirm_clear(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.ledger.request_clear_all()?;
                self.selected = 0;
                self.set_status("All records cleared.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmClearAll),
        }
    }

    fn open_edit_form(&mut self, handle: RowHandle) -> Mode {
        match self.ledger.request_edit(handle) {
            Some(record) => Mode::Form(RecordForm::for_edit(self.date_value.clone(), &record)),
            None => {
                self.set_status("Row no longer exists.", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn sort(&mut self, column: SortColumn) {
        let direction = self.ledger.request_sort(column);
        self.set_status(
            format!("Sorted by {} ({}).", column.label(), direction.label()),
            StatusKind::Info,
        );
    }

    fn selected_handle(&self) -> Option<RowHandle> {
        self.ledger
            .table()
            .record_at(self.selected)
            .map(|(handle, _)| handle)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.ledger.table().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected as isize;
        self.selected = (current + delta).clamp(0, len as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.ledger.table().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Surface a fatal-looking error in the footer instead of crashing the
    /// draw loop.
    pub fn report_error(&mut self, err: &anyhow::Error) {
        self.set_status(surface_error(err), StatusKind::Error);
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(FOOTER_HEIGHT)])
            .split(frame.area());

        self.draw_table(frame, chunks[0]);
        self.draw_footer(frame, chunks[1]);

        match &self.mode {
            Mode::Normal => {}
            Mode::Form(form) => self.draw_form(frame, form),
            Mode::ConfirmClearAll => self.draw_confirm_clear(frame),
        }
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        let header = Row::new(
            [
                "Date [1]",
                "Client [2]",
                "DDT [3]",
                "Amount [4]",
            ]
            .map(|title| Cell::from(title).style(Style::default().add_modifier(Modifier::BOLD))),
        );

        let rows: Vec<Row> = self
            .ledger
            .table()
            .iter()
            .map(|(_, record)| {
                Row::new([
                    Cell::from(record.date.clone()),
                    Cell::from(record.client.clone()),
                    Cell::from(record.ddt.clone()),
                    Cell::from(record.amount.clone()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(12),
            Constraint::Min(16),
            Constraint::Length(11),
            Constraint::Length(12),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" DDT Ledger "),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if !self.ledger.table().is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(
            "↑/↓ select · + add · Enter edit · - delete · c clear all · 1-4 sort · q quit",
        )];

        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.text.clone(),
                status.kind.style(),
            )));
        }

        let footer = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, area);
    }

    fn draw_form(&self, frame: &mut Frame, form: &RecordForm) {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);

        let title = if self.ledger.is_editing() {
            " Edit Record "
        } else {
            " Add Record "
        };

        let mut lines = vec![
            form.build_line("Date", RecordField::Date),
            form.build_line("Client", RecordField::Client),
            form.build_line("DDT", RecordField::Ddt),
            form.build_line("Amount", RecordField::Amount),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Tab next field · Enter save · Esc cancel",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let widget = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_alignment(Alignment::Center),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(widget, area);

        self.place_cursor(frame, area, form);
    }

    /// Park the terminal cursor at the end of the active field so typing
    /// feels like a real input box.
    fn place_cursor(&self, frame: &mut Frame, area: Rect, form: &RecordForm) {
        let field_row = match form.active {
            RecordField::Date => 0u16,
            RecordField::Client => 1,
            RecordField::Ddt => 2,
            RecordField::Amount => 3,
        };
        let label_len = match form.active {
            RecordField::Date => "Date: ".len(),
            RecordField::Client => "Client: ".len(),
            RecordField::Ddt => "DDT: ".len(),
            RecordField::Amount => "Amount: ".len(),
        };
        let x = area.x + 1 + (label_len + form.active_len()) as u16;
        let y = area.y + 1 + field_row;
        if x < area.right() && y < area.bottom() {
            frame.set_cursor_position(Position::new(x, y));
        }
    }

    fn draw_confirm_clear(&self, frame: &mut Frame) {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);

        let count = self.ledger.table().len();
        let lines = vec![
            Line::from(format!("Delete all {count} records?")),
            Line::from(""),
            Line::from(Span::styled(
                "y confirm · n cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let widget = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Clear All ")
                    .title_alignment(Alignment::Center),
            );
        frame.render_widget(widget, area);
    }
}
