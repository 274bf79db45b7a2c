//! Exploration Module
//!
//! Read-only access to per-quadrant exploration state. The store is
//! best-effort: any failure falls back to an all-unexplored square.

mod file;
mod memory;

use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::square::{QuadrantId, QuadrantStatus, QuadrantStatuses, SquareId};

pub use file::JsonFileExplorationStore;
pub use memory::MemoryExplorationStore;

// == Records ==
/// Exploration state of one quadrant as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantRecord {
    /// Quadrant label; unknown labels are ignored
    pub id: String,
    #[serde(default)]
    pub status: QuadrantStatus,
}

/// Exploration state of one square as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquareRecord {
    pub square: String,
    /// Optional replacement base image URL
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub quadrants: Vec<QuadrantRecord>,
}

impl SquareRecord {
    pub fn new(square: &SquareId) -> Self {
        Self {
            square: square.to_string(),
            image: None,
            quadrants: Vec::new(),
        }
    }

    /// Builder-style helper to set one quadrant's status.
    pub fn with_quadrant(mut self, quadrant: QuadrantId, status: QuadrantStatus) -> Self {
        self.quadrants.push(QuadrantRecord {
            id: quadrant.to_string(),
            status,
        });
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }
}

/// Source of exploration records.
pub trait ExplorationStore: Send + Sync {
    /// Looks up the record of `square`; `Ok(None)` when it has none.
    fn lookup<'a>(&'a self, square: &'a SquareId) -> BoxFuture<'a, Result<Option<SquareRecord>, StoreError>>;
}

// == Snapshot ==
/// What a render needs from the exploration store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplorationSnapshot {
    pub statuses: QuadrantStatuses,
    pub base_override: Option<String>,
}

impl ExplorationSnapshot {
    /// Applies a record over the all-unexplored default.
    pub fn from_record(record: &SquareRecord) -> Self {
        let mut statuses = QuadrantStatuses::default();
        for quadrant in &record.quadrants {
            match quadrant.id.parse::<QuadrantId>() {
                Ok(id) => statuses.set(id, quadrant.status),
                Err(_) => debug!(square = %record.square, id = %quadrant.id, "Ignoring unknown quadrant id"),
            }
        }

        Self {
            statuses,
            base_override: record.image.clone().filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Reads the exploration snapshot of `square`, never failing.
///
/// Store errors, timeouts and missing records all produce the default
/// all-unexplored snapshot.
pub async fn resolve_snapshot(
    store: &dyn ExplorationStore,
    square: &SquareId,
    timeout: Duration,
) -> ExplorationSnapshot {
    match tokio::time::timeout(timeout, store.lookup(square)).await {
        Ok(Ok(Some(record))) => ExplorationSnapshot::from_record(&record),
        Ok(Ok(None)) => {
            debug!(square = %square, "No exploration record, using defaults");
            ExplorationSnapshot::default()
        }
        Ok(Err(e)) => {
            warn!(square = %square, error = %e, "Exploration lookup failed, using defaults");
            ExplorationSnapshot::default()
        }
        Err(_) => {
            warn!(square = %square, timeout_ms = timeout.as_millis() as u64, "Exploration lookup timed out, using defaults");
            ExplorationSnapshot::default()
        }
    }
}
