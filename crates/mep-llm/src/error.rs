use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request timeout after {0:?}")]
    Timeout(Duration),

    #[error("LLM endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("LLM API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to parse LLM response: {0}")]
    Decode(String),
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;
