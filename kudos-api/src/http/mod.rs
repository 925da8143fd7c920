//! HTTP surface for product reviews.

mod error;
mod extract;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tracing::info;

pub use error::ApiError;
pub use extract::{BearerToken, JsonBadRequest};
pub use routes::{create_router, create_router_with_body_limit, DEFAULT_BODY_LIMIT};
pub use state::AppState;

/// Serve `router` on `addr` until `shutdown` resolves.
pub async fn run_http_server(
    router: Router,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
