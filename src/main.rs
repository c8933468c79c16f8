//! Binary entry point that glues the SQLite-backed record store to the TUI.
//! The bootstrapping pipeline: open the KV store, hydrate the ledger (records
//! plus the remembered last date), and drive the Ratatui event loop until the
//! user exits.
use ddt_ledger::{run_app, App, KvStore, Ledger, RecordStore, SortBehavior};

/// Initialize persistence, load cached data, and launch the Ratatui event
/// loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable home directory) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let store = RecordStore::new(KvStore::open()?);
    let ledger = Ledger::load(store, SortBehavior::SharedToggle)?;

    let mut app = App::new(ledger)?;
    run_app(&mut app)
}
