use thiserror::Error;

#[derive(Error, Debug)]
pub enum MepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<::config::ConfigError> for MepError {
    fn from(err: ::config::ConfigError) -> Self {
        MepError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MepError>;
