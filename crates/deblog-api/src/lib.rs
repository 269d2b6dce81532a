//! # deblog-api
//!
//! REST API layer for deblog. Serves three surfaces from one router:
//! the client surface (auth, posts, timeline), the administrative peer
//! directory, and the peer-facing federation receiver.

pub mod auth;
pub mod middleware;
pub mod routes;

use axum::Router;
use deblog_db::Database;
use deblog_federation::Propagator;
use std::sync::Arc;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Outbound propagator — post create/delete handlers hand it events
    /// together with a snapshot of the peer directory.
    pub propagator: Arc<Propagator>,
    /// Public instance hostname (e.g. "blog-a.example"). Used as the
    /// self-federation guard when validating peer hostnames.
    pub server_name: String,
}

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::posts::router())
        .merge(routes::peers::router())
        .merge(routes::health::router())
        // Peer-facing federation receiver — no client auth, origin comes
        // from the transport context.
        .merge(routes::federation::router())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
