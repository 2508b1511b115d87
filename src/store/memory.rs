//! In-memory [`Store`] implementation.
//!
//! A `HashMap` keyed by email behind `std::sync::RwLock`. Records are
//! inserted whole, so a poisoned lock never exposes a half-written entry
//! and is recovered instead of propagated.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::models::Record;

use super::Store;

/// Process-lifetime record store. Created empty, only ever grows or overwrites.
#[derive(Debug)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryStore {
    fn put(&self, email: &str, record: Record) {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if records.insert(email.to_string(), record).is_some() {
            debug!(email, "overwrote existing record");
        }
    }

    fn all_values(&self) -> Vec<Record> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
