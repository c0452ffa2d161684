//! Commit history for the audit viewer's release log, read through libgit2.

pub mod errors;
pub mod history;
pub mod repo;

pub use errors::{GitHistoryError, Result};
pub use history::{recent_history, HistoryOptions};
pub use repo::GitRepository;
