//! folio presence gateway.
//!
//! - WebSocket endpoint: /socket
//! - Ops: /healthz, /readyz, /stats, /metrics
//! - Graceful shutdown on Ctrl-C: readyz flips to 503, sessions close, then
//!   the presence dispatcher is stopped and awaited

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use folio_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("folio_gateway=info"));
    fmt().with_env_filter(filter).init();

    let cfg = config::load_from_env()?;
    let listen: SocketAddr = cfg.gateway.listen.parse()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "folio-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    let last = state.shutdown().await?;
    tracing::info!(
        connections = last.connections,
        online_users = last.online_users,
        "folio-gateway stopped"
    );
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(sessions = state.open_sessions(), "shutdown requested, draining");
    state.begin_drain();
}
