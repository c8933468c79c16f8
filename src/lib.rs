//! Core library surface for the DDT Ledger TUI application.
//!
//! The public modules exposed here keep the API intentionally small: the
//! `bin` target and the tests reuse the same pieces, and the re-exports
//! document which types matter at each seam (persistence, view ordering,
//! and the operations the UI drives).
pub mod editor;
pub mod models;
pub mod projection;
pub mod store;
pub mod ui;

/// The persistence layer: a two-key durable KV store and the record list
/// living on top of it.
pub use store::{KvStore, RecordStore};

/// The primary domain type plus the sortable column set.
pub use models::{Record, SortColumn};

/// View-side ordering and the shared-vs-per-column sort direction policy.
pub use projection::{RowHandle, SortBehavior, TableProjection};

/// The operations the presentation surface invokes.
pub use editor::{Ledger, SubmitError, SubmitInput, SubmitOutcome};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
