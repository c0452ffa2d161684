//! Whole-file JSON persistence for comments and feedback.
//!
//! Each store serializes its own writers behind an async mutex, and every
//! write replaces the file through a sibling temp file plus rename.

use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{CommentMap, FeedbackRecord, Result};

/// A JSON document stored as a single file.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the document, treating a missing file as `T::default()`.
    pub async fn read<T: DeserializeOwned + Default>(&self) -> Result<T> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the document, falling back to `T::default()` on a missing or corrupt file.
    pub async fn read_or_default<T: DeserializeOwned + Default>(&self) -> T {
        match self.read().await {
            Ok(value) => value,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "discarding unreadable document");
                T::default()
            }
        }
    }

    pub async fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        let body = serde_json::to_string_pretty(value)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let staging = self.staging_path();
        tokio::fs::write(&staging, body).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(path = ?self.path, "document written");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Per-commit comments, persisted as one flat JSON object.
pub struct CommentStore {
    doc: JsonDocument,
    write_lock: Mutex<()>,
}

impl CommentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: JsonDocument::new(path),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn all(&self) -> Result<CommentMap> {
        self.doc.read().await
    }

    /// Insert or replace the comment for `hash`. An unreadable file is
    /// replaced rather than blocking the write.
    pub async fn upsert(&self, hash: &str, comment: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut comments: CommentMap = self.doc.read_or_default().await;
        comments.insert(hash.to_string(), comment.into());
        self.doc.write(&comments).await
    }
}

/// Append-only feedback log, persisted as one JSON array.
pub struct FeedbackStore {
    doc: JsonDocument,
    write_lock: Mutex<()>,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: JsonDocument::new(path),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn all(&self) -> Result<Vec<FeedbackRecord>> {
        self.doc.read().await
    }

    pub async fn append(&self, record: FeedbackRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<FeedbackRecord> = self.doc.read_or_default().await;
        records.push(record);
        self.doc.write(&records).await
    }
}
