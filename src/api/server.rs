//! Server lifecycle: bind, serve, and shut down on ctrl-c.

use std::net::SocketAddr;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Bind and serve the API until interrupted.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(%local, "API server listening");

    axum::serve(listener, api_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
