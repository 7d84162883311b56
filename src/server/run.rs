//! Server startup and lifecycle

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::metrics::RequestCounters;
use crate::relay::cache::{VersionCache, VersionLookup};
use crate::relay::error::StartupError;
use crate::relay::fetcher::HttpFetcher;
use crate::relay::store::BoundedStore;
use crate::relay::validator::UrlValidator;
use crate::server::handler::AppState;
use crate::server::router::build_router;

/// Builds the shared state from `config`
///
/// Fails on an invalid allow pattern or a zero fetch timeout; the relay must
/// never start without a working allowlist.
pub fn build_state(config: &RelayConfig) -> Result<AppState, StartupError> {
    let validator = UrlValidator::new(&config.allow)?;
    let fetcher = HttpFetcher::new(config.fetch_timeout())?;

    let lookup: Arc<dyn VersionLookup> = match config.max_entries {
        Some(capacity) => {
            let store = BoundedStore::new(capacity);
            info!("Caching at most {} upstream URLs", store.capacity());
            Arc::new(VersionCache::with_store(fetcher, store, config.freshness()))
        }
        None => Arc::new(VersionCache::new(fetcher, config.freshness())),
    };

    Ok(AppState::new(
        validator,
        lookup,
        Arc::new(RequestCounters::new()),
    ))
}

/// Binds the listen address and serves until Ctrl-C
pub async fn run_server(config: RelayConfig) -> anyhow::Result<()> {
    let state = build_state(&config).context("Invalid configuration")?;
    let address = config.listen_address()?;

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    info!(
        "Listening on {} (allow: {:?}, freshness: {:?}, fetch timeout: {:?})",
        listener.local_addr()?,
        state.validator.pattern(),
        config.freshness(),
        config.fetch_timeout()
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
