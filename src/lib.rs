pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod session;

use tracing_subscriber::EnvFilter;

use crate::api::types::ApiContext;
use crate::config::RemoteConfig;

/// Initialize tracing and run the API server until interrupted.
pub async fn run() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let remote = RemoteConfig::from_env();
    if remote.credential.is_none() {
        tracing::warn!("no {} set; hosted models run anonymously", config::TOKEN_ENV);
    }

    let ctx = ApiContext::new(remote);
    api::server::serve(ctx, config::bind_addr()).await
}
