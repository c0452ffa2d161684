use std::{
    env,
    path::{Path, PathBuf},
};

use ::config as cfg;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{MepError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3001,
        }
    }
}

/// Filesystem locations. Relative entries resolve against `project_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for input schedules and used as the audit working directory
    pub project_dir: PathBuf,
    /// Built front-end bundle
    pub static_dir: PathBuf,
    /// Regulatory PDF library
    pub manuals_dir: PathBuf,
    pub comments_file: PathBuf,
    pub feedback_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            static_dir: PathBuf::from("dist"),
            manuals_dir: PathBuf::from("manuals"),
            comments_file: PathBuf::from("comments.json"),
            feedback_file: PathBuf::from("feedback.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub interpreter: String,
    pub script: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            script: PathBuf::from("mep_validator_agent_v2.py"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualsConfig {
    pub interpreter: String,
    pub query_script: PathBuf,
    pub ingest_script: PathBuf,
}

impl Default for ManualsConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            query_script: PathBuf::from("query_manuals.py"),
            ingest_script: PathBuf::from("ingest_manuals.py"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub ollama_url: String,
    pub default_model: String,
    pub vision_model: String,
    /// Generation timeout; generous because cold model loads are slow
    pub timeout_secs: u64,
    pub health_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://127.0.0.1:11434".into(),
            default_model: "biomistral".into(),
            vision_model: "moondream".into(),
            timeout_secs: 120,
            health_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub max_commits: usize,
    pub deepen_depth: i32,
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            max_commits: 50,
            deepen_depth: 50,
            remote: "origin".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub audit: AuditConfig,
    pub manuals: ManualsConfig,
    pub llm: LlmConfig,
    pub git: GitConfig,
}

impl Settings {
    /// Load settings from the layered sources:
    ///
    /// 1. `default.toml`
    /// 2. `{env_name}.toml`
    /// 3. `local.toml`
    /// 4. Environment variables (`MEP__SECTION__KEY`)
    /// 5. `PORT`, which overrides `server.port` when set
    pub fn load(config_dir: &Path, env_name: &str) -> Result<Self> {
        let builder = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                cfg::Environment::with_prefix("MEP")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Ok(port) = env::var("PORT") {
            settings.server.port = port
                .parse()
                .map_err(|_| MepError::Config(format!("PORT is not a valid port: {port}")))?;
            debug!(port = settings.server.port, "server port taken from PORT");
        }

        settings.validate()?;
        info!(?config_dir, env = env_name, "configuration loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(MepError::Config("server.port must be non-zero".into()));
        }
        if self.llm.timeout_secs == 0 || self.llm.health_timeout_secs == 0 {
            return Err(MepError::Config("llm timeouts must be non-zero".into()));
        }
        if self.git.max_commits == 0 {
            return Err(MepError::Config("git.max_commits must be non-zero".into()));
        }
        if self.audit.interpreter.trim().is_empty() || self.manuals.interpreter.trim().is_empty() {
            return Err(MepError::Config("script interpreters must be set".into()));
        }
        Ok(())
    }

    /// Project directory as an absolute path, anchored at the process
    /// working directory when configured relative.
    pub fn project_root(&self) -> PathBuf {
        let dir = &self.paths.project_dir;
        if dir.is_absolute() {
            return dir.clone();
        }
        match env::current_dir() {
            Ok(cwd) => cwd.join(dir),
            Err(e) => {
                warn!(error = %e, "cannot determine working directory; keeping relative project_dir");
                dir.clone()
            }
        }
    }

    /// Resolve a configured path against the project directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root().join(path)
        }
    }

    pub fn static_dir(&self) -> PathBuf {
        self.resolve(&self.paths.static_dir)
    }

    pub fn manuals_dir(&self) -> PathBuf {
        self.resolve(&self.paths.manuals_dir)
    }

    pub fn comments_file(&self) -> PathBuf {
        self.resolve(&self.paths.comments_file)
    }

    pub fn feedback_file(&self) -> PathBuf {
        self.resolve(&self.paths.feedback_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.llm.default_model, "biomistral");
        assert_eq!(settings.git.max_commits, 50);
    }

    #[test]
    fn file_layers_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[llm]\ntimeout_secs = 30\n[paths]\nproject_dir = \"/srv/mep\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("staging.toml"), "[llm]\ntimeout_secs = 45\n").unwrap();

        let settings = Settings::load(dir.path(), "staging").unwrap();
        assert_eq!(settings.llm.timeout_secs, 45);
        assert_eq!(settings.llm.health_timeout_secs, 5);
        assert_eq!(settings.paths.project_dir, PathBuf::from("/srv/mep"));
        assert_eq!(
            settings.comments_file(),
            PathBuf::from("/srv/mep/comments.json")
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut settings = Settings::default();
        settings.llm.timeout_secs = 0;
        assert!(matches!(settings.validate(), Err(MepError::Config(_))));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let mut settings = Settings::default();
        settings.paths.static_dir = PathBuf::from("/opt/dist");
        assert_eq!(settings.static_dir(), PathBuf::from("/opt/dist"));
    }

    #[test]
    fn relative_project_dir_is_anchored_at_working_directory() {
        let mut settings = Settings::default();
        settings.paths.project_dir = PathBuf::from("data");
        let cwd = env::current_dir().unwrap();

        assert_eq!(settings.project_root(), cwd.join("data"));
        assert_eq!(
            settings.resolve(Path::new("audit.py")),
            cwd.join("data").join("audit.py")
        );
        assert!(settings.manuals_dir().is_absolute());
    }
}
