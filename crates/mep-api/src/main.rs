use anyhow::Context;
use clap::Parser;
use mep_api::{AppState, Server};
use mep_core::Settings;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mep-server", version, about = "MEP audit viewer API server")]
struct Args {
    /// Directory holding default.toml, <env>.toml and local.toml
    #[arg(long, env = "MEP_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Configuration environment name
    #[arg(long, env = "MEP_ENV", default_value = "development")]
    env: String,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Directory containing input schedules and the audit scripts
    #[arg(long)]
    project_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mep_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(&args.config_dir, &args.env)
        .with_context(|| format!("loading configuration from {:?}", args.config_dir))?;

    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(dir) = args.project_dir {
        settings.paths.project_dir = dir;
    }
    settings.paths.project_dir = settings.project_root();
    settings.validate()?;

    info!(
        project_dir = ?settings.paths.project_dir,
        ollama = %settings.llm.ollama_url,
        "starting MEP audit server"
    );

    let server = Server::new(AppState::new(settings))?;
    server.run().await
}
