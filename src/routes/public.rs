use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without credentials under the default allow-list. Neither one
/// returns record contents.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(handlers::health))
        // GET /db-console
        // Active store backend and per-table row counts.
        .route("/db-console", get(handlers::db_console))
}
