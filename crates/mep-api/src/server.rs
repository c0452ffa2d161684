use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

use crate::{create_router, AppState};

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub fn new(state: AppState) -> anyhow::Result<Self> {
        let server = &state.settings.server;
        let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;
        Ok(Self { state, addr })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let static_dir = self.state.settings.static_dir();
        let router = create_router(self.state);

        let listener = {
            let socket = if self.addr.is_ipv6() {
                tokio::net::TcpSocket::new_v6()
            } else {
                tokio::net::TcpSocket::new_v4()
            }?;
            // Quick rebinds across restarts
            let _ = socket.set_reuseaddr(true);
            socket.bind(self.addr)?;
            socket.listen(1024)?
        };

        info!("MEP audit server listening on http://{}", self.addr);
        if !static_dir.join("index.html").exists() {
            warn!(dir = ?static_dir, "front-end bundle not built yet; serving placeholder");
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
