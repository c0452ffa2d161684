use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{GenerationBackend, GenerationRequest, LlmError, LlmResult};

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub health_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            timeout: Duration::from_secs(120),
            health_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&mep_core::LlmConfig> for OllamaConfig {
    fn from(cfg: &mep_core::LlmConfig) -> Self {
        Self {
            base_url: cfg.ollama_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            health_timeout: Duration::from_secs(cfg.health_timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "no_images")]
    images: &'a [String],
    stream: bool,
}

fn no_images(images: &&[String]) -> bool {
    images.is_empty()
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    response: String,
    #[serde(default)]
    eval_count: Option<usize>,
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> LlmResult<String> {
        let start = Instant::now();
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            images: &request.images,
            stream: false,
        };

        debug!(
            model = %request.model,
            images = request.images.len(),
            "sending generation request"
        );

        let call = async {
            let response = self
                .client
                .post(format!("{}/api/generate", self.config.base_url))
                .json(&body)
                .send()
                .await
                .map_err(|e| LlmError::Unreachable(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(status = status.as_u16(), "LLM returned an error status");
                return Err(LlmError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<GenerateReply>()
                .await
                .map_err(|e| LlmError::Decode(e.to_string()))
        };

        let reply = timeout(self.config.timeout, call)
            .await
            .map_err(|_| LlmError::Timeout(self.config.timeout))??;

        info!(
            model = %request.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            completion_tokens = reply.eval_count.unwrap_or(0),
            "generation completed"
        );
        Ok(reply.response)
    }

    async fn is_available(&self) -> bool {
        let check = self
            .client
            .get(format!("{}/api/tags", self.config.base_url))
            .send();
        match timeout(self.config.health_timeout, check).await {
            Ok(Ok(resp)) => resp.status().is_success(),
            Ok(Err(e)) => {
                debug!(error = %e, "LLM health check failed");
                false
            }
            Err(_) => {
                debug!("LLM health check timed out");
                false
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.config.base_url
    }
}
