//! Peer directory routes — administrative, all authenticated.
//!
//! The directory drives propagation targets and nothing else. Every
//! successful mutation is committed before the response returns, so the
//! propagator's next snapshot sees it.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::get,
};
use deblog_common::{
    error::{DeblogError, DeblogResult},
    models::peer::{PeerListResponse, PeerRequest},
    validation::{validate_hostname, validate_request},
};
use deblog_db::repository::peers;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Peer management router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/peers", get(list_peers).post(add_peer).delete(remove_peer))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// GET /peers
///
/// Hostnames in insertion order, stable across restarts.
async fn list_peers(State(state): State<Arc<AppState>>) -> DeblogResult<Json<PeerListResponse>> {
    let peers = peers::list_hostnames(&state.db.pg).await?;
    Ok(Json(PeerListResponse { peers }))
}

/// POST /peers
///
/// Add a peer hostname. Duplicate adds are a 409 conflict, never a second
/// row.
async fn add_peer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PeerRequest>,
) -> DeblogResult<Json<MessageResponse>> {
    validate_request(&body)?;
    validate_hostname(&body.hostname, &state.server_name)?;

    let added = peers::add(&state.db.pg, &body.hostname).await?;
    if added.is_none() {
        return Err(DeblogError::AlreadyExists {
            resource: "Peer".into(),
        });
    }

    tracing::info!(hostname = %body.hostname, "Peer added");
    Ok(Json(MessageResponse {
        message: format!("Peer {} added", body.hostname),
    }))
}

/// DELETE /peers
///
/// Remove a peer hostname; 404 if it is not in the directory.
async fn remove_peer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PeerRequest>,
) -> DeblogResult<Json<MessageResponse>> {
    validate_request(&body)?;

    let removed = peers::remove(&state.db.pg, &body.hostname).await?;
    if !removed {
        return Err(DeblogError::NotFound {
            resource: "Peer".into(),
        });
    }

    tracing::info!(hostname = %body.hostname, "Peer removed");
    Ok(Json(MessageResponse {
        message: format!("Peer {} removed", body.hostname),
    }))
}
