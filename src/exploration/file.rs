//! Exploration store backed by a JSON document on disk.
//!
//! The file is re-read on every lookup so edits by the game bot show up on
//! the next render without a restart.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::warn;

use super::{ExplorationStore, SquareRecord};
use crate::error::StoreError;
use crate::square::SquareId;

/// On-disk layout: `{ "squares": [ SquareRecord, ... ] }`, kept as raw
/// values so each record is decoded on its own.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    squares: Vec<serde_json::Value>,
}

/// Reads exploration records from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileExplorationStore {
    path: PathBuf,
}

impl JsonFileExplorationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExplorationStore for JsonFileExplorationStore {
    fn lookup<'a>(&'a self, square: &'a SquareId) -> BoxFuture<'a, Result<Option<SquareRecord>, StoreError>> {
        Box::pin(async move {
            let raw = tokio::fs::read(&self.path).await?;
            let document: RawDocument = serde_json::from_slice(&raw)?;
            let wanted = square.to_string();

            // A malformed record only hides itself, not the rest of the document
            Ok(document
                .squares
                .into_iter()
                .filter_map(|value| match serde_json::from_value::<SquareRecord>(value) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(path = %self.path.display(), error = %e, "Skipping malformed exploration record");
                        None
                    }
                })
                .find(|record| record.square.trim().eq_ignore_ascii_case(&wanted)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::{QuadrantId, QuadrantStatus};
    use std::io::Write;

    fn write_doc(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_lookup_finds_record() {
        let file = write_doc(
            r#"{"squares": [
                {"square": "h8", "image": "https://cdn.example/h8.png",
                 "quadrants": [{"id": "Q1", "status": "explored"}, {"id": "Q2", "status": "weird"}]}
            ]}"#,
        );
        let store = JsonFileExplorationStore::new(file.path());

        let record = store
            .lookup(&SquareId::parse("H8").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.image.as_deref(), Some("https://cdn.example/h8.png"));
        assert_eq!(record.quadrants[0].status, QuadrantStatus::Explored);
        assert_eq!(record.quadrants[1].status, QuadrantStatus::Unexplored);
        assert_eq!(record.quadrants[0].id, QuadrantId::Q1.to_string());
    }

    #[tokio::test]
    async fn test_lookup_missing_square() {
        let file = write_doc(r#"{"squares": []}"#);
        let store = JsonFileExplorationStore::new(file.path());
        assert!(store.lookup(&SquareId::parse("A1").unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_record_does_not_hide_others() {
        let file = write_doc(
            r#"{"squares": [
                {"square": 42, "quadrants": "nope"},
                {"square": "C4", "quadrants": [{"id": "Q1", "status": 7}, {"id": "Q2", "status": "secured"}]}
            ]}"#,
        );
        let store = JsonFileExplorationStore::new(file.path());

        let record = store
            .lookup(&SquareId::parse("C4").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.quadrants[0].status, QuadrantStatus::Unexplored);
        assert_eq!(record.quadrants[1].status, QuadrantStatus::Secured);
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let file = write_doc("{ not json");
        let store = JsonFileExplorationStore::new(file.path());
        let result = store.lookup(&SquareId::parse("A1").unwrap()).await;
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let store = JsonFileExplorationStore::new("/nonexistent/exploration.json");
        let result = store.lookup(&SquareId::parse("A1").unwrap()).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
