//! Regulatory manual library: PDF listing plus the retrieval and ingest
//! scripts that back evidence lookups.

use mep_core::{Evidence, Settings};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::ApiError;

#[derive(Debug, Error)]
pub enum ManualError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Manual search failed")]
    Query(String),

    #[error("Re-index failed")]
    Reindex(String),

    #[error("Cannot read manuals directory")]
    Listing(#[source] std::io::Error),
}

impl From<ManualError> for ApiError {
    fn from(err: ManualError) -> Self {
        match err {
            ManualError::EmptyQuery => ApiError::BadRequest(err.to_string()),
            ManualError::Query(ref details) | ManualError::Reindex(ref details) => {
                ApiError::internal_with(err.to_string(), details)
            }
            ManualError::Listing(ref e) => ApiError::internal_with(err.to_string(), e),
        }
    }
}

/// Output contract of the query script.
#[derive(Debug, Deserialize)]
struct QueryOutput {
    #[serde(default)]
    results: Option<Vec<Evidence>>,
    #[serde(default)]
    error: Option<String>,
}

pub struct ManualLibrary {
    interpreter: String,
    query_script: PathBuf,
    ingest_script: PathBuf,
    manuals_dir: PathBuf,
    working_dir: PathBuf,
}

impl ManualLibrary {
    pub fn new(settings: &Settings) -> Self {
        Self {
            interpreter: settings.manuals.interpreter.clone(),
            query_script: settings.resolve(&settings.manuals.query_script),
            ingest_script: settings.resolve(&settings.manuals.ingest_script),
            manuals_dir: settings.manuals_dir(),
            working_dir: settings.project_root(),
        }
    }

    /// Sorted `.pdf` names in the manuals directory; a missing directory is empty.
    pub async fn list_manuals(&self) -> Result<Vec<String>, ManualError> {
        let mut entries = match tokio::fs::read_dir(&self.manuals_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ManualError::Listing(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(ManualError::Listing)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.to_lowercase().ends_with(".pdf") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Evidence passages for `query`. The script process is killed if the
    /// returned future is dropped.
    pub async fn query(&self, query: &str) -> Result<Vec<Evidence>, ManualError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ManualError::EmptyQuery);
        }

        debug!(%query, "querying manual library");
        let output = Command::new(&self.interpreter)
            .arg(&self.query_script)
            .arg(query)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ManualError::Query(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(status = ?output.status.code(), %stderr, "query script failed");
            return Err(ManualError::Query(stderr));
        }

        let parsed: QueryOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| ManualError::Query(format!("unparseable script output: {e}")))?;
        match parsed {
            QueryOutput {
                error: Some(message),
                ..
            } => Err(ManualError::Query(message)),
            QueryOutput { results, .. } => Ok(results.unwrap_or_default()),
        }
    }

    /// Rebuild the search index; returns the ingest script's log.
    pub async fn reindex(&self) -> Result<String, ManualError> {
        info!(dir = ?self.manuals_dir, "re-indexing manuals");
        let output = Command::new(&self.interpreter)
            .arg(&self.ingest_script)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ManualError::Reindex(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            error!(%stderr, "ingest script failed");
            return Err(ManualError::Reindex(stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
