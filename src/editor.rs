//! The operations the presentation surface calls: submit, edit, delete,
//! clear-all, and sort. This layer keeps the persisted store and the table
//! projection consistent with each other and owns the "which row is being
//! edited" state explicitly, so the UI never has to thread a hidden global
//! around.

use anyhow::Result;
use thiserror::Error;

use crate::models::{is_valid_ddt, Record, SortColumn};
use crate::projection::{RowHandle, SortBehavior, SortDirection, TableProjection};
use crate::store::RecordStore;

/// Why a submit was rejected. No mutation has happened in either case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Shown to the user. Checked first, so an empty DDT lands here rather
    /// than in the silent incomplete-input path.
    #[error("The DDT number must be exactly 9 digits.")]
    InvalidDdt,
    /// Some required field was empty after trimming. The original form
    /// swallowed this without a message, and we keep that behavior.
    #[error("all fields are required")]
    IncompleteInput,
}

/// Raw form values as typed by the user. Trimming happens inside `submit`.
#[derive(Debug, Default, Clone)]
pub struct SubmitInput {
    pub date: String,
    pub client: String,
    pub ddt: String,
    pub amount: String,
}

/// What a successful submit did, so the UI can phrase its status line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added(RowHandle),
    Updated(RowHandle),
}

/// The row currently loaded into the form for editing. `original` is the
/// record as displayed when editing began; it is the probe for the
/// tuple-match update against the store.
struct EditTarget {
    handle: RowHandle,
    original: Record,
}

/// Store and projection glued together behind the operations the UI needs.
pub struct Ledger {
    store: RecordStore,
    table: TableProjection,
    editing: Option<EditTarget>,
}

impl Ledger {
    /// Hydrate the table from persisted records, in insertion order.
    pub fn load(store: RecordStore, sort_behavior: SortBehavior) -> Result<Self> {
        let mut table = TableProjection::new(sort_behavior);
        for record in store.load_all()? {
            table.append(record);
        }
        Ok(Self {
            store,
            table,
            editing: None,
        })
    }

    pub fn table(&self) -> &TableProjection {
        &self.table
    }

    /// Whether a submit would update an existing row instead of adding one.
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Date to seed the form with on startup.
    pub fn last_date(&self) -> Result<Option<String>> {
        self.store.last_date()
    }

    /// Validate the input and either append a new record or, when an edit is
    /// pending, replace the edited row and every tuple-equal stored record.
    ///
    /// Validation order matches the original form: the DDT format is checked
    /// first (with a user-facing message), then the emptiness of the other
    /// fields (silently). Nothing is written unless validation passes.
    pub fn submit(&mut self, input: &SubmitInput) -> Result<Result<SubmitOutcome, SubmitError>> {
        let date = input.date.trim();
        let client = input.client.trim();
        let ddt = input.ddt.trim();
        let amount = input.amount.trim();

        if !is_valid_ddt(ddt) {
            return Ok(Err(SubmitError::InvalidDdt));
        }
        if date.is_empty() || client.is_empty() || amount.is_empty() {
            return Ok(Err(SubmitError::IncompleteInput));
        }

        let record = Record::new(date, client, ddt, amount);

        // The fallible store write always happens before the view or the
        // editing state change hands. If it errors, the table still shows
        // the old record and the pending edit stays armed, so the user can
        // simply retry the submit.
        let outcome = match &self.editing {
            Some(target) => {
                self.store.update_by_match(&target.original, &record)?;
                let handle = target.handle;
                self.table.replace(handle, record);
                self.editing = None;
                SubmitOutcome::Updated(handle)
            }
            None => {
                self.store.add(&record)?;
                let handle = self.table.append(record);
                SubmitOutcome::Added(handle)
            }
        };

        Ok(Ok(outcome))
    }

    /// Begin editing the row behind `handle`, returning a copy of its record
    /// so the form can be populated. Returns `None` (and arms nothing) when
    /// the handle no longer resolves.
    pub fn request_edit(&mut self, handle: RowHandle) -> Option<Record> {
        let record = self.table.record_for(handle)?.clone();
        self.editing = Some(EditTarget {
            handle,
            original: record.clone(),
        });
        Some(record)
    }

    /// Forget any pending edit, e.g. when the user cancels the form.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Delete the row behind `handle` from the view and every tuple-equal
    /// record from the store.
    pub fn request_delete(&mut self, handle: RowHandle) -> Result<()> {
        if let Some(record) = self.table.record_for(handle).cloned() {
            self.store.delete_by_match(&record)?;
            self.table.remove(handle);
            // If this row was armed for editing, the edit target is gone.
            if let Some(target) = &self.editing {
                if target.handle == handle {
                    self.editing = None;
                }
            }
        }
        Ok(())
    }

    /// Wipe the store and the view. The last-used date survives (see
    /// `RecordStore::clear`); any pending edit is dropped.
    pub fn request_clear_all(&mut self) -> Result<()> {
        self.store.clear()?;
        self.table.clear();
        self.editing = None;
        Ok(())
    }

    /// Re-order the view only; persisted order is untouched.
    pub fn request_sort(&mut self, column: SortColumn) -> SortDirection {
        self.table.sort_by(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KvStore;

    fn ledger() -> Ledger {
        let store = RecordStore::new(KvStore::open_in_memory().unwrap());
        Ledger::load(store, SortBehavior::SharedToggle).unwrap()
    }

    fn input(date: &str, client: &str, ddt: &str, amount: &str) -> SubmitInput {
        SubmitInput {
            date: date.into(),
            client: client.into(),
            ddt: ddt.into(),
            amount: amount.into(),
        }
    }

    fn acme() -> SubmitInput {
        input("2024-01-01", "Acme", "123456789", "10.50")
    }

    #[test]
    fn submit_adds_and_persists() {
        let mut ledger = ledger();
        let outcome = ledger.submit(&acme()).unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Added(_)));
        assert_eq!(ledger.table().len(), 1);
        assert_eq!(ledger.last_date().unwrap().as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn submit_trims_surrounding_whitespace() {
        let mut ledger = ledger();
        ledger
            .submit(&input(" 2024-01-01 ", " Acme ", " 123456789 ", " 10.50 "))
            .unwrap()
            .unwrap();
        let (_, record) = ledger.table().record_at(0).unwrap();
        assert_eq!(record, &Record::new("2024-01-01", "Acme", "123456789", "10.50"));
    }

    #[test]
    fn bad_ddt_is_rejected_before_any_mutation() {
        let mut ledger = ledger();
        for ddt in ["12345678", "1234567890", "12A456789", ""] {
            let result = ledger
                .submit(&input("2024-01-01", "Acme", ddt, "10.50"))
                .unwrap();
            assert_eq!(result, Err(SubmitError::InvalidDdt));
        }
        assert!(ledger.table().is_empty());
        assert_eq!(ledger.last_date().unwrap(), None);
    }

    #[test]
    fn empty_fields_abort_silently() {
        let mut ledger = ledger();
        let result = ledger.submit(&input("", "Acme", "123456789", "10.50")).unwrap();
        assert_eq!(result, Err(SubmitError::IncompleteInput));

        let result = ledger.submit(&input("2024-01-01", "   ", "123456789", "1")).unwrap();
        assert_eq!(result, Err(SubmitError::IncompleteInput));
        assert!(ledger.table().is_empty());
    }

    #[test]
    fn edit_then_submit_updates_instead_of_adding() {
        let mut ledger = ledger();
        let outcome = ledger.submit(&acme()).unwrap().unwrap();
        let handle = match outcome {
            SubmitOutcome::Added(handle) => handle,
            other => panic!("unexpected outcome {other:?}"),
        };

        let record = ledger.request_edit(handle).unwrap();
        assert_eq!(record.client, "Acme");
        assert!(ledger.is_editing());

        let outcome = ledger
            .submit(&input("2024-01-01", "Acme Corp", "123456789", "11.00"))
            .unwrap()
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Updated(handle));
        // The edit state is consumed by the submit.
        assert!(!ledger.is_editing());

        assert_eq!(ledger.table().len(), 1);
        assert_eq!(ledger.table().record_for(handle).unwrap().client, "Acme Corp");
    }

    #[test]
    fn delete_removes_row_and_all_stored_duplicates() {
        let mut ledger = ledger();
        ledger.submit(&acme()).unwrap().unwrap();
        let outcome = ledger.submit(&acme()).unwrap().unwrap();
        let handle = match outcome {
            SubmitOutcome::Added(handle) => handle,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(ledger.table().len(), 2);

        ledger.request_delete(handle).unwrap();
        // Only the targeted row leaves the view, but both tuple-equal
        // records are gone from the store.
        assert_eq!(ledger.table().len(), 1);
        assert!(ledger.store.load_all().unwrap().is_empty());
    }

    #[test]
    fn failed_store_write_leaves_view_and_edit_state_alone() {
        // A trigger that rejects every UPDATE on the kv table: the first
        // write of a key takes the INSERT path and succeeds, overwriting it
        // (as update_by_match must) hits the UPDATE path and fails.
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE kv (key TEXT PRIMARY KEY, value TEXT NOT NULL);
             CREATE TRIGGER kv_reject_updates BEFORE UPDATE ON kv
             BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END;",
        )
        .unwrap();
        let store = RecordStore::new(KvStore::with_connection(conn).unwrap());
        let mut ledger = Ledger::load(store, SortBehavior::SharedToggle).unwrap();

        let outcome = ledger.submit(&acme()).unwrap().unwrap();
        let handle = match outcome {
            SubmitOutcome::Added(handle) => handle,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert!(ledger.request_edit(handle).is_some());

        let err = ledger
            .submit(&input("2024-01-01", "Acme Corp", "123456789", "11.00"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to write kv entry"));

        // View and store still agree on the old record, and the edit is
        // still armed so the next submit retries the update instead of
        // adding a duplicate.
        assert_eq!(ledger.table().record_for(handle).unwrap().client, "Acme");
        assert_eq!(ledger.store.load_all().unwrap(), vec![Record::new(
            "2024-01-01",
            "Acme",
            "123456789",
            "10.50",
        )]);
        assert!(ledger.is_editing());
    }

    #[test]
    fn clear_all_resets_view_and_pending_edit() {
        let mut ledger = ledger();
        let outcome = ledger.submit(&acme()).unwrap().unwrap();
        let handle = match outcome {
            SubmitOutcome::Added(handle) => handle,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert!(ledger.request_edit(handle).is_some());

        ledger.request_clear_all().unwrap();
        assert!(ledger.table().is_empty());
        assert!(!ledger.is_editing());
        // The last-used date survives clear-all.
        assert_eq!(ledger.last_date().unwrap().as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn end_to_end_single_row_sort_scenario() {
        let mut ledger = ledger();
        ledger.submit(&acme()).unwrap().unwrap();

        assert_eq!(ledger.request_sort(SortColumn::Ddt), SortDirection::Ascending);
        let (_, record) = ledger.table().record_at(0).unwrap();
        assert_eq!(record.client, "Acme");

        // The shared toggle has flipped, so sorting a different column is
        // now descending.
        assert_eq!(
            ledger.request_sort(SortColumn::Client),
            SortDirection::Descending
        );
    }

    #[test]
    fn reload_preserves_insertion_order_despite_sorting() {
        let store = RecordStore::new(KvStore::open_in_memory().unwrap());
        store
            .add(&Record::new("2024-03-01", "beta", "222222222", "2"))
            .unwrap();
        store
            .add(&Record::new("2024-01-01", "alpha", "111111111", "1"))
            .unwrap();

        let mut ledger = Ledger::load(store, SortBehavior::SharedToggle).unwrap();
        ledger.request_sort(SortColumn::Date);
        assert_eq!(ledger.table().record_at(0).unwrap().1.client, "alpha");

        // Persisted order is still insertion order.
        let records = ledger.store.load_all().unwrap();
        assert_eq!(records[0].client, "beta");
        assert_eq!(records[1].client, "alpha");
    }
}
