use anyhow::{Context, Result};

use crate::models::Record;

use super::kv::KvStore;

/// KV key holding the serialized record array.
const RECORDS_KEY: &str = "data";
/// KV key holding the last date the user submitted, restored into the form on
/// the next start so repeated entry for the same day is faster.
const LAST_DATE_KEY: &str = "savedDate";

/// Authoritative persisted record list.
///
/// Records are stored as one JSON array under a single key, in insertion
/// order. There is no index beyond a linear scan, and identity is tuple
/// equality over all four fields: `update_by_match` and `delete_by_match`
/// affect every stored record equal to the probe, which is exactly how the
/// ledger has always behaved when duplicates exist.
pub struct RecordStore {
    kv: KvStore,
}

impl RecordStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Load every persisted record in insertion order.
    ///
    /// A missing key yields an empty list. So does a payload that fails to
    /// deserialize: corrupted storage is treated as "no data" rather than an
    /// error, because there is nothing useful the caller could do with a
    /// half-broken array. Real I/O failures from SQLite still propagate.
    pub fn load_all(&self) -> Result<Vec<Record>> {
        let raw = self.kv.get(RECORDS_KEY)?;
        Ok(raw
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default())
    }

    /// Append a record and remember its date as the last-used date.
    ///
    /// No uniqueness check is performed; duplicate tuples are stored
    /// independently.
    pub fn add(&self, record: &Record) -> Result<()> {
        let mut records = self.load_all()?;
        records.push(record.clone());
        self.save_all(&records)?;
        self.kv.set(LAST_DATE_KEY, &record.date)
    }

    /// Replace every stored record whose tuple equals `old` with `new`,
    /// returning how many were replaced. Zero matches leaves the store
    /// unchanged and is not an error.
    pub fn update_by_match(&self, old: &Record, new: &Record) -> Result<usize> {
        let mut records = self.load_all()?;
        let mut replaced = 0;
        for record in records.iter_mut() {
            if record == old {
                *record = new.clone();
                replaced += 1;
            }
        }
        if replaced > 0 {
            self.save_all(&records)?;
        }
        Ok(replaced)
    }

    /// Remove every stored record whose tuple equals `record`, returning how
    /// many were removed. Zero matches is a silent no-op.
    pub fn delete_by_match(&self, record: &Record) -> Result<usize> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|stored| stored != record);
        let removed = before - records.len();
        if removed > 0 {
            self.save_all(&records)?;
        }
        Ok(removed)
    }

    /// Drop the whole record collection.
    ///
    /// The last-used date deliberately survives a clear: the original ledger
    /// only removed the record key, and keeping the date seed is useful when
    /// the user starts re-entering documents right after wiping the table.
    pub fn clear(&self) -> Result<()> {
        self.kv.remove(RECORDS_KEY)
    }

    /// The date of the most recently added record, if any was ever stored.
    pub fn last_date(&self) -> Result<Option<String>> {
        self.kv.get(LAST_DATE_KEY)
    }

    fn save_all(&self, records: &[Record]) -> Result<()> {
        let json = serde_json::to_string(records).context("failed to serialize records")?;
        self.kv.set(RECORDS_KEY, &json)
    }
}
