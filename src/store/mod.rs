//! Persistence module split across logical submodules.

mod kv;
mod records;

pub use kv::KvStore;
pub use records::RecordStore;
