#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use mep_api::{create_router, AppState};
use mep_core::Settings;
use mep_llm::{GenerationBackend, GenerationRequest, LlmError, LlmResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// A project directory plus settings pointing every path into it.
pub struct Fixture {
    pub dir: TempDir,
    pub settings: Settings,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.project_dir = dir.path().to_path_buf();
        settings.audit.interpreter = "sh".into();
        settings.audit.script = PathBuf::from("audit.sh");
        settings.manuals.interpreter = "sh".into();
        settings.manuals.query_script = PathBuf::from("query.sh");
        settings.manuals.ingest_script = PathBuf::from("ingest.sh");
        settings.llm.timeout_secs = 2;
        settings.llm.health_timeout_secs = 1;
        Self { dir, settings }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Router using the real Ollama client against `settings.llm.ollama_url`.
    pub fn server(&self) -> TestServer {
        let state = AppState::new(self.settings.clone());
        TestServer::new(create_router(state)).unwrap()
    }

    pub fn server_with(&self, llm: Arc<dyn GenerationBackend>) -> TestServer {
        let state = AppState::with_backend(self.settings.clone(), llm);
        TestServer::new(create_router(state)).unwrap()
    }
}

/// URL of a local port with nothing listening.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Backend that answers `<model>: <prompt>` and records every request.
#[derive(Default)]
pub struct EchoBackend {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub online: bool,
}

impl EchoBackend {
    pub fn online() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            online: true,
        })
    }

    pub fn last(&self) -> GenerationRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl GenerationBackend for EchoBackend {
    async fn generate(&self, request: &GenerationRequest) -> LlmResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.online {
            return Err(LlmError::Timeout(Duration::from_secs(1)));
        }
        Ok(format!("{}: {}", request.model, request.prompt))
    }

    async fn is_available(&self) -> bool {
        self.online
    }

    fn endpoint(&self) -> &str {
        "http://echo.test"
    }
}
