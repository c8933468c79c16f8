//! In-memory ordered view of the records currently shown in the table.
//!
//! The projection is deliberately decoupled from the persisted order: sorting
//! re-orders rows here and never writes back to the store, so the stored
//! sequence stays in insertion order while the view moves freely. Rows carry
//! opaque generated handles so edit and delete can target the exact row the
//! user picked without re-matching field values (tuple matching stays a
//! store-level concern).

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::{Record, SortColumn};

/// Opaque identity of one displayed row. Handles are never reused within a
/// projection, so a handle to a removed row simply stops matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RowHandle(u64);

/// How `sort_by` decides direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortBehavior {
    /// One projection-wide ascending/descending flag, flipped unconditionally
    /// after every sort call regardless of which column was requested. This
    /// is how the original ledger behaved: sorting by date then by client
    /// gives ascending then descending, even though the column changed.
    SharedToggle,
    /// Conventional per-column direction: re-sorting the same column toggles,
    /// switching to a different column starts ascending again.
    PerColumn,
}

struct Row {
    handle: RowHandle,
    record: Record,
}

/// Ordered collection of displayed rows plus the sort direction state.
pub struct TableProjection {
    rows: Vec<Row>,
    next_handle: u64,
    behavior: SortBehavior,
    descending: bool,
    last_column: Option<SortColumn>,
}

impl TableProjection {
    pub fn new(behavior: SortBehavior) -> Self {
        Self {
            rows: Vec::new(),
            next_handle: 0,
            behavior,
            descending: false,
            last_column: None,
        }
    }

    /// Add one row at the end of the current view and hand back its identity.
    pub fn append(&mut self, record: Record) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        self.rows.push(Row { handle, record });
        handle
    }

    /// Overwrite the displayed values of the row behind `handle` without
    /// moving it. An unknown handle is a silent no-op.
    pub fn replace(&mut self, handle: RowHandle, record: Record) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.handle == handle) {
            row.record = record;
        }
    }

    /// Remove the row behind `handle` from the view, if still present.
    pub fn remove(&mut self, handle: RowHandle) {
        self.rows.retain(|row| row.handle != handle);
    }

    /// Empty the view. Sort state is left alone.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The record displayed at `index` in the current order.
    pub fn record_at(&self, index: usize) -> Option<(RowHandle, &Record)> {
        self.rows.get(index).map(|row| (row.handle, &row.record))
    }

    /// Look up a row's current record by handle.
    pub fn record_for(&self, handle: RowHandle) -> Option<&Record> {
        self.rows
            .iter()
            .find(|row| row.handle == handle)
            .map(|row| &row.record)
    }

    /// Iterate rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = (RowHandle, &Record)> {
        self.rows.iter().map(|row| (row.handle, &row.record))
    }

    /// Re-order the view by `column` and return the direction that was used
    /// for this call.
    ///
    /// The sort is stable, and every comparator treats unparseable values as
    /// equal, so rows with garbage in the sorted column keep their relative
    /// order instead of jumping around.
    pub fn sort_by(&mut self, column: SortColumn) -> SortDirection {
        let direction = self.next_direction(column);

        self.rows.sort_by(|a, b| {
            let ordering = compare(column, &a.record, &b.record);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });

        direction
    }

    fn next_direction(&mut self, column: SortColumn) -> SortDirection {
        let descending = match self.behavior {
            SortBehavior::SharedToggle => {
                let current = self.descending;
                // Flipped unconditionally, shared across all columns.
                self.descending = !current;
                current
            }
            SortBehavior::PerColumn => {
                let current = if self.last_column == Some(column) {
                    !self.descending
                } else {
                    false
                };
                self.descending = current;
                current
            }
        };
        self.last_column = Some(column);

        if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

/// Direction actually applied by a `sort_by` call, mostly for status output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// Column comparator. The client ordering is lowercase lexicographic, an
/// approximation of locale-aware collation that matches it for ASCII data;
/// the other columns parse their values and fall back to `Equal`.
fn compare(column: SortColumn, a: &Record, b: &Record) -> Ordering {
    match column {
        SortColumn::Date => compare_parsed(parse_date(&a.date), parse_date(&b.date)),
        SortColumn::Client => a
            .client
            .to_lowercase()
            .cmp(&b.client.to_lowercase()),
        SortColumn::Ddt => compare_parsed(parse_leading_int(&a.ddt), parse_leading_int(&b.ddt)),
        SortColumn::Amount => match (parse_amount(&a.amount), parse_amount(&b.amount)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// Compare two parse results, treating any unparseable side as equal so the
/// stable sort leaves such rows where they were.
fn compare_parsed<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse the leading decimal digits of a string, the way `parseInt` would:
/// surrounding whitespace and an optional sign are accepted, and parsing
/// stops at the first non-digit instead of failing.
fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, client: &str, ddt: &str, amount: &str) -> Record {
        Record::new(date, client, ddt, amount)
    }

    fn clients(projection: &TableProjection) -> Vec<String> {
        projection
            .iter()
            .map(|(_, record)| record.client.clone())
            .collect()
    }

    fn seeded() -> TableProjection {
        let mut projection = TableProjection::new(SortBehavior::SharedToggle);
        projection.append(record("2024-03-01", "beta", "222222222", "20.00"));
        projection.append(record("2024-01-01", "Alpha", "333333333", "5.50"));
        projection.append(record("2024-02-01", "gamma", "111111111", "10.00"));
        projection
    }

    #[test]
    fn append_replace_remove_by_handle() {
        let mut projection = TableProjection::new(SortBehavior::SharedToggle);
        let first = projection.append(record("2024-01-01", "Alpha", "111111111", "1"));
        let second = projection.append(record("2024-01-02", "Beta", "222222222", "2"));

        projection.replace(first, record("2024-01-01", "Alpha Ltd", "111111111", "1"));
        assert_eq!(projection.record_for(first).unwrap().client, "Alpha Ltd");
        // Replacing does not move the row.
        assert_eq!(projection.record_at(0).unwrap().1.client, "Alpha Ltd");

        projection.remove(second);
        assert_eq!(projection.len(), 1);
        assert!(projection.record_for(second).is_none());

        // Stale handles are silent no-ops.
        projection.remove(second);
        projection.replace(second, record("x", "y", "z", "w"));
        assert_eq!(projection.len(), 1);
    }

    #[test]
    fn sorts_each_column_ascending_first() {
        let mut projection = seeded();

        projection.sort_by(SortColumn::Date);
        assert_eq!(clients(&projection), ["Alpha", "gamma", "beta"]);

        let mut projection = seeded();
        projection.sort_by(SortColumn::Client);
        assert_eq!(clients(&projection), ["Alpha", "beta", "gamma"]);

        let mut projection = seeded();
        projection.sort_by(SortColumn::Ddt);
        assert_eq!(clients(&projection), ["gamma", "beta", "Alpha"]);

        let mut projection = seeded();
        projection.sort_by(SortColumn::Amount);
        assert_eq!(clients(&projection), ["Alpha", "gamma", "beta"]);
    }

    #[test]
    fn shared_toggle_flips_every_call() {
        let mut projection = seeded();

        assert_eq!(
            projection.sort_by(SortColumn::Date),
            SortDirection::Ascending
        );
        // Same column again: descending.
        assert_eq!(
            projection.sort_by(SortColumn::Date),
            SortDirection::Descending
        );
        assert_eq!(clients(&projection), ["beta", "gamma", "Alpha"]);

        // A *different* column keeps alternating the shared flag instead of
        // resetting to ascending.
        assert_eq!(
            projection.sort_by(SortColumn::Client),
            SortDirection::Ascending
        );
        assert_eq!(
            projection.sort_by(SortColumn::Ddt),
            SortDirection::Descending
        );
    }

    #[test]
    fn per_column_resets_on_column_change() {
        let mut projection = TableProjection::new(SortBehavior::PerColumn);
        projection.append(record("2024-03-01", "beta", "222222222", "20.00"));
        projection.append(record("2024-01-01", "Alpha", "333333333", "5.50"));

        assert_eq!(
            projection.sort_by(SortColumn::Date),
            SortDirection::Ascending
        );
        assert_eq!(
            projection.sort_by(SortColumn::Date),
            SortDirection::Descending
        );
        // Switching columns starts over at ascending.
        assert_eq!(
            projection.sort_by(SortColumn::Client),
            SortDirection::Ascending
        );
        assert_eq!(
            projection.sort_by(SortColumn::Client),
            SortDirection::Descending
        );
    }

    #[test]
    fn unparseable_values_keep_their_relative_order() {
        let mut projection = TableProjection::new(SortBehavior::SharedToggle);
        projection.append(record("not-a-date", "first", "abc", "n/a"));
        projection.append(record("2024-01-01", "second", "111111111", "1.00"));
        projection.append(record("also-bad", "third", "xyz", "??"));

        projection.sort_by(SortColumn::Date);
        // The two unparseable dates compare equal to everything, so the
        // stable sort leaves all three rows untouched.
        assert_eq!(clients(&projection), ["first", "second", "third"]);

        projection.sort_by(SortColumn::Amount);
        assert_eq!(clients(&projection), ["first", "second", "third"]);
    }

    #[test]
    fn client_sort_ignores_case() {
        let mut projection = TableProjection::new(SortBehavior::SharedToggle);
        projection.append(record("2024-01-01", "zeta", "111111111", "1"));
        projection.append(record("2024-01-02", "Alpha", "222222222", "2"));
        projection.append(record("2024-01-03", "BETA", "333333333", "3"));

        projection.sort_by(SortColumn::Client);
        assert_eq!(clients(&projection), ["Alpha", "BETA", "zeta"]);
    }

    #[test]
    fn ddt_sort_uses_leading_digits() {
        assert_eq!(parse_leading_int("123abc"), Some(123));
        assert_eq!(parse_leading_int("  42"), Some(42));
        assert_eq!(parse_leading_int("-7x"), Some(-7));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn single_row_sort_is_stable() {
        let mut projection = TableProjection::new(SortBehavior::SharedToggle);
        projection.append(record("2024-01-01", "Acme", "123456789", "10.50"));

        projection.sort_by(SortColumn::Ddt);
        assert_eq!(clients(&projection), ["Acme"]);
        // Per the shared toggle, the next sort call is descending no matter
        // which column it names.
        assert_eq!(
            projection.sort_by(SortColumn::Client),
            SortDirection::Descending
        );
    }
}
