//! Serve command - Run the review HTTP service

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use kudos_api::http::{create_router_with_body_limit, run_http_server, AppState};
use kudos_core::auth::AccountDirectory;
use kudos_core::{Config, LoginService, ReviewService, SessionTokens, StoreBackend};
use kudos_db::{MemoryReviewStore, ReviewStore, SqliteReviewStore};

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Skip inserting the configured seed reviews
    #[arg(long)]
    pub no_seed: bool,
}

/// Build the review store selected by the configuration
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn ReviewStore>> {
    let store: Arc<dyn ReviewStore> = match config.storage.backend {
        StoreBackend::Memory => Arc::new(MemoryReviewStore::new()),
        StoreBackend::Sqlite => Arc::new(
            SqliteReviewStore::open(config.storage.database_config())
                .await
                .with_context(|| {
                    format!(
                        "Failed to open review database at {}",
                        config.storage.path.display()
                    )
                })?,
        ),
    };
    Ok(store)
}

/// Wire store, sessions and services into the HTTP application state
pub async fn build_state(config: &Config, seed: bool) -> anyhow::Result<AppState> {
    let store = open_store(config).await?;
    let sessions = Arc::new(SessionTokens::with_ttl(config.auth.session_ttl));

    let reviews = ReviewService::new(store, sessions.clone())
        .with_edit_policy(config.reviews.edit_policy);
    if seed && config.reviews.seed {
        let added = reviews.seed(&config.reviews.seed_reviews).await?;
        tracing::debug!(added, "Seed step finished");
    }

    let login = LoginService::new(
        AccountDirectory::new(config.auth.accounts.clone()),
        sessions,
    );

    Ok(AppState::new(reviews, login))
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let addr: SocketAddr = config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            backend = %config.storage.backend,
            edit_policy = %config.reviews.edit_policy,
            "Starting kudos"
        );

        let state = build_state(config, !self.no_seed).await?;
        let router = create_router_with_body_limit(state, config.server.body_limit_bytes);

        run_http_server(router, addr, shutdown_signal()).await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
