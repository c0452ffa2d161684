use chrono::{DateTime, FixedOffset};
use git2::{FetchOptions, Repository, RepositoryOpenFlags, Sort};
use mep_core::CommitEntry;
use std::path::Path;
use tracing::debug;

use crate::errors::*;

pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository containing `path`, searching parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let repo = Repository::open_ext(
            path_ref,
            RepositoryOpenFlags::empty(),
            &[] as &[&std::ffi::OsStr],
        )
        .map_err(|_| GitHistoryError::RepoNotFound(path_ref.display().to_string()))?;
        Ok(Self { repo })
    }

    pub fn is_shallow(&self) -> bool {
        self.repo.is_shallow()
    }

    /// Up to `max` commits reachable from HEAD, newest first.
    ///
    /// An unborn HEAD (fresh repository) yields an empty list.
    pub fn recent_commits(&self, max: usize) -> Result<Vec<CommitEntry>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        match revwalk.push_head() {
            Ok(()) => {}
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        }

        let mut commits = Vec::with_capacity(max.min(256));
        for oid in revwalk.take(max) {
            let commit = self.repo.find_commit(oid?)?;
            let author = commit.author();
            commits.push(CommitEntry {
                hash: commit.id().to_string(),
                author: author.name().unwrap_or("unknown").to_string(),
                date: short_date(&author.when()),
                message: commit.summary().unwrap_or("").to_string(),
            });
        }
        Ok(commits)
    }

    /// Fetch from `remote` with the given depth, extending a shallow history.
    pub fn deepen(&self, remote: &str, depth: i32) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|_| GitHistoryError::RemoteNotFound(remote.to_string()))?;
        let mut opts = FetchOptions::new();
        opts.depth(depth);
        remote.fetch(&[] as &[&str], Some(&mut opts), None)?;
        debug!(depth, "fetched deeper history");
        Ok(())
    }
}

/// Format a commit time as `YYYY-MM-DD` in the author's own timezone.
fn short_date(time: &git2::Time) -> String {
    let Some(utc) = DateTime::from_timestamp(time.seconds(), 0) else {
        return String::new();
    };
    match FixedOffset::east_opt(time.offset_minutes() * 60) {
        Some(offset) => utc.with_timezone(&offset).format("%Y-%m-%d").to_string(),
        None => utc.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_date_uses_author_offset() {
        // 2025-03-01T23:30:00Z, author at +01:00 -> already March 2nd locally
        let time = git2::Time::new(1_740_871_800, 60);
        assert_eq!(short_date(&time), "2025-03-02");
        let utc = git2::Time::new(1_740_871_800, 0);
        assert_eq!(short_date(&utc), "2025-03-01");
    }
}
