//! Storage abstraction for ingested records.
//!
//! The [`Store`] trait is the seam between ingestion and querying: the
//! parsers hand validated [`Record`]s to [`Store::put`], and both query
//! surfaces read a snapshot through [`Store::all_values`] before handing it
//! to the [sort engine](crate::sort).
//!
//! Implementations must be `Send + Sync`; the shell and the HTTP server
//! share one instance across threads.

pub mod memory;

use crate::models::Record;

/// Keyed record storage with last-write-wins upsert semantics.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`put`](Store::put) | Insert or overwrite the record for an email |
/// | [`all_values`](Store::all_values) | Snapshot of every stored record, unordered |
pub trait Store: Send + Sync {
    /// Unconditionally stores `record` under `email`, replacing any prior record.
    fn put(&self, email: &str, record: Record);

    /// Returns a snapshot of all stored records.
    ///
    /// Iteration order is unspecified; callers sort.
    fn all_values(&self) -> Vec<Record>;

    /// Number of stored records.
    fn len(&self) -> usize {
        self.all_values().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upserts each record under its own email. Returns how many were written.
    fn upsert_all(&self, records: Vec<Record>) -> usize {
        let count = records.len();
        for record in records {
            let email = record.email().to_string();
            self.put(&email, record);
        }
        count
    }
}
