//! Runs the external audit engine and collects its JSON report.
//!
//! Contract with the engine: `<interpreter> <script> --file <path> --job <ref>`,
//! zero exit on success. The report is taken from the path handed over in
//! `MEP_AUDIT_RESULT_PATH` when the engine writes it there, and otherwise
//! from the first `- <path>.json` line of its standard output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::ApiError;

/// Environment variable naming where the engine may write its report.
pub const RESULT_PATH_ENV: &str = "MEP_AUDIT_RESULT_PATH";

static RESULT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"- (.+\.json)").expect("result marker pattern is valid")
});

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Missing filename or job reference")]
    MissingInput,

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Failed to save uploaded file")]
    SaveUpload(#[source] std::io::Error),

    #[error("Failed to start audit engine")]
    Spawn(#[source] std::io::Error),

    #[error("Audit execution failed")]
    Failed { stderr: String },

    #[error("Could not locate result JSON in script output")]
    ResultNotFound,

    #[error("Cannot read result file")]
    ReadResult(#[source] std::io::Error),

    #[error("Result file is not valid JSON")]
    InvalidResult(#[source] serde_json::Error),
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::MissingInput | AuditError::InvalidFileName(_) => {
                ApiError::BadRequest(err.to_string())
            }
            AuditError::Failed { ref stderr } => ApiError::internal_with(err.to_string(), stderr),
            AuditError::SaveUpload(ref e)
            | AuditError::Spawn(ref e)
            | AuditError::ReadResult(ref e) => ApiError::internal_with(err.to_string(), e),
            AuditError::InvalidResult(ref e) => ApiError::internal_with(err.to_string(), e),
            AuditError::ResultNotFound => ApiError::internal(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditRequest {
    pub file_name: Option<String>,
    pub job_ref: Option<String>,
    /// Raw file body to persist under `file_name` before running
    pub file_content: Option<String>,
}

pub struct AuditRunner {
    interpreter: String,
    script: PathBuf,
    project_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl AuditRunner {
    pub fn new(settings: &mep_core::Settings) -> Self {
        Self {
            interpreter: settings.audit.interpreter.clone(),
            script: settings.resolve(&settings.audit.script),
            project_dir: settings.project_root(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub async fn run(&self, request: AuditRequest) -> Result<Value, AuditError> {
        let file_name = non_blank(request.file_name).ok_or(AuditError::MissingInput)?;
        let job_ref = non_blank(request.job_ref).ok_or(AuditError::MissingInput)?;
        validate_file_name(&file_name)?;

        let input_path = self.project_dir.join(&file_name);
        if let Some(content) = request.file_content.filter(|c| !c.is_empty()) {
            tokio::fs::write(&input_path, content)
                .await
                .map_err(AuditError::SaveUpload)?;
            info!(path = ?input_path, "saved uploaded file");
        }

        let scratch = ScratchFile(
            self.scratch_dir
                .join(format!("mep-audit-{}.json", uuid::Uuid::new_v4())),
        );

        info!(file = %file_name, job = %job_ref, "running audit");
        let output = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg("--file")
            .arg(&input_path)
            .arg("--job")
            .arg(&job_ref)
            .env(RESULT_PATH_ENV, &scratch.0)
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(AuditError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            error!(status = ?output.status.code(), %stderr, "audit engine failed");
            return Err(AuditError::Failed { stderr });
        }

        let report_path = if tokio::fs::try_exists(&scratch.0).await.unwrap_or(false) {
            scratch.0.clone()
        } else {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let marked = locate_result(&stdout).ok_or_else(|| {
                warn!("audit output contained no result marker");
                AuditError::ResultNotFound
            })?;
            self.project_dir.join(marked)
        };

        debug!(path = ?report_path, "reading audit report");
        let raw = tokio::fs::read_to_string(&report_path)
            .await
            .map_err(AuditError::ReadResult)?;
        serde_json::from_str(&raw).map_err(AuditError::InvalidResult)
    }
}

/// First `- <path>.json` occurrence in the engine's console output.
pub fn locate_result(stdout: &str) -> Option<PathBuf> {
    RESULT_MARKER
        .captures(stdout)
        .and_then(|c| c.get(1))
        .map(|m| PathBuf::from(m.as_str().trim()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_file_name(name: &str) -> Result<(), AuditError> {
    let path = Path::new(name);
    let plain = path.file_name().map(|f| f == path.as_os_str()).unwrap_or(false);
    if !plain || name.contains('/') || name.contains('\\') {
        return Err(AuditError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// Result path handed to the engine; removed on every exit from `run`.
struct ScratchFile(PathBuf);

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = ?self.0, error = %e, "could not remove scratch result");
            }
        }
    }
}
