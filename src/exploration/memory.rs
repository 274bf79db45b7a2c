//! In-memory exploration store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use futures::future::BoxFuture;

use super::{ExplorationStore, SquareRecord};
use crate::error::StoreError;
use crate::square::SquareId;

/// Exploration records held in process memory, keyed by square.
#[derive(Debug, Default)]
pub struct MemoryExplorationStore {
    records: RwLock<HashMap<String, SquareRecord>>,
    unavailable: AtomicBool,
}

impl MemoryExplorationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `record.square`.
    pub fn set_record(&self, record: SquareRecord) {
        if let Ok(mut records) = self.records.write() {
            records.insert(record.square.to_ascii_uppercase(), record);
        }
    }

    /// While set, every lookup fails as if the store were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl ExplorationStore for MemoryExplorationStore {
    fn lookup<'a>(&'a self, square: &'a SquareId) -> BoxFuture<'a, Result<Option<SquareRecord>, StoreError>> {
        Box::pin(async move {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("store marked unavailable".to_string()));
            }

            let records = self
                .records
                .read()
                .map_err(|_| StoreError::Unavailable("record lock poisoned".to_string()))?;
            Ok(records.get(&square.to_string()).cloned())
        })
    }
}
