use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use payrep_server::{find_available_port, router, AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let state = AppState::from_env();
    tokio::fs::create_dir_all(&state.uploads_dir).await?;
    tokio::fs::create_dir_all(&state.processed_dir).await?;

    let logs_dir = std::env::var("PAYREP_LOGS").unwrap_or_else(|_| "logs".into());
    tokio::fs::create_dir_all(&logs_dir).await?;

    let port = find_available_port(5000, 5020).ok_or_else(|| {
        tracing::error!("no available ports in range 5000-5020");
        std::io::Error::other("no available port")
    })?;

    // Companion tooling polls this file to find the chosen port.
    tokio::fs::write(format!("{logs_dir}/server_port.txt"), port.to_string()).await?;

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, router(state)).await
}
