use mep_core::CommitEntry;
use std::path::Path;
use tracing::{info, warn};

use crate::{errors::*, GitRepository};

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub max_commits: usize,
    pub deepen_depth: i32,
    pub remote: String,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_commits: 50,
            deepen_depth: 50,
            remote: "origin".into(),
        }
    }
}

impl From<&mep_core::GitConfig> for HistoryOptions {
    fn from(cfg: &mep_core::GitConfig) -> Self {
        Self {
            max_commits: cfg.max_commits,
            deepen_depth: cfg.deepen_depth,
            remote: cfg.remote.clone(),
        }
    }
}

/// Recent commit log for the repository containing `path`.
///
/// A shallow clone that exposes a single commit is deepened once and
/// re-read; if the fetch fails the single commit is returned as-is.
pub fn recent_history(path: &Path, opts: &HistoryOptions) -> Result<Vec<CommitEntry>> {
    let repo = GitRepository::open(path)?;
    let history = repo.recent_commits(opts.max_commits)?;

    if history.len() != 1 || !repo.is_shallow() {
        return Ok(history);
    }

    info!("shallow clone detected, deepening history");
    match repo.deepen(&opts.remote, opts.deepen_depth) {
        Ok(()) => repo.recent_commits(opts.max_commits),
        Err(e) => {
            warn!(error = %e, "failed to deepen shallow clone");
            Ok(history)
        }
    }
}
