//! # deblog server
//!
//! One process serves everything this node needs:
//! - the client REST API (accounts, posts, timeline)
//! - the administrative peer directory
//! - the peer-facing federation receiver
//!
//! Outbound propagation runs inside the same process as background worker
//! tasks owned by the propagator.

use deblog_api::{AppState, build_router};
use deblog_db::Database;
use deblog_federation::Propagator;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = deblog_common::config::init()?;

    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deblog=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .init();

    tracing::info!("Starting deblog v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Instance name: {}", config.server.name);

    // Connect to the database and run migrations
    let db = Database::connect(config).await?;
    db.migrate().await?;

    // === Outbound propagator ===
    // Owns the per-peer delivery queues; post handlers feed it events with
    // a snapshot of the peer directory.
    let propagator = Arc::new(Propagator::new(
        config.server.name.clone(),
        config.federation.scheme.clone(),
        Duration::from_secs(config.federation.request_timeout_secs),
    ));

    let state = AppState {
        db,
        propagator,
        server_name: config.server.name.clone(),
    };
    let router = build_router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // ConnectInfo gives the federation receiver the peer socket address,
    // which is the fallback origin when no X-Forwarded-For is present.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
