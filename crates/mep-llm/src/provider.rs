use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::LlmResult;

/// A single non-streaming generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    /// Base64-encoded images for vision models
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl GenerationRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    pub fn vision(model: impl Into<String>, prompt: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images,
        }
    }
}

/// Backend able to turn a prompt into text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion; blocks until the whole response is available.
    async fn generate(&self, request: &GenerationRequest) -> LlmResult<String>;

    /// Cheap reachability check that does not generate text.
    async fn is_available(&self) -> bool;

    /// Base URL of the backend, for operator hints.
    fn endpoint(&self) -> &str;
}
