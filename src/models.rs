//! Domain models shared by the persistence layer, the table projection, and
//! the TUI. These types stay light-weight data holders so the other layers can
//! focus on storage and presentation logic. The serde renames pin the on-disk
//! JSON keys to the original Spanish field names so existing ledgers keep
//! loading after upgrades.

use serde::{Deserialize, Serialize};

/// One ledger entry: a delivery document (DDT) registered against a client.
///
/// There is deliberately no surrogate id. A record is identified by the full
/// 4-tuple of its field values, so two records with identical fields are
/// indistinguishable to the store and match-based operations affect all of
/// them at once. All fields are kept as the raw strings the user typed; the
/// sort comparators parse them on the fly and fall back gracefully when a
/// value does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Entry date, expected in ISO `YYYY-MM-DD` form (not enforced on save).
    #[serde(rename = "fecha")]
    pub date: String,
    /// Client the document was issued to.
    #[serde(rename = "cliente")]
    pub client: String,
    /// DDT number: exactly 9 ASCII digits, checked before any mutation.
    pub ddt: String,
    /// Monetary amount, expected decimal-parseable (not enforced on save).
    #[serde(rename = "importe")]
    pub amount: String,
}

impl Record {
    pub fn new(
        date: impl Into<String>,
        client: impl Into<String>,
        ddt: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            client: client.into(),
            ddt: ddt.into(),
            amount: amount.into(),
        }
    }
}

/// Columns a user can sort the table by. Mirrors the four record fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortColumn {
    Date,
    Client,
    Ddt,
    Amount,
}

impl SortColumn {
    /// Header label shown in the table and in sort status messages.
    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Date => "Date",
            SortColumn::Client => "Client",
            SortColumn::Ddt => "DDT",
            SortColumn::Amount => "Amount",
        }
    }
}

/// Whether a string is a well-formed DDT number: exactly 9 ASCII digits.
pub fn is_valid_ddt(value: &str) -> bool {
    value.len() == 9 && value.bytes().all(|b| b.is_ascii_digit())
}
