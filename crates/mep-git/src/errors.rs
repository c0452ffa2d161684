use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitHistoryError>;

#[derive(Debug, Error)]
pub enum GitHistoryError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found at path: {0}")]
    RepoNotFound(String),

    #[error("Remote not found: {0}")]
    RemoteNotFound(String),
}
