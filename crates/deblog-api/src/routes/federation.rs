//! Inbound federation receiver — the endpoints remote propagators call.
//!
//! These are accessed by *peer instances*, not by end-user clients, and
//! carry no client auth. The origin instance is derived from the transport
//! context — first hop of `X-Forwarded-For` when a proxy terminates the
//! connection, else the socket peer address — and never from the request
//! body, so a body cannot claim another instance's identity and collide
//! with its cache keys.
//!
//! Both operations are idempotent, which keeps the protocol
//! liveness-friendly: a duplicated publish upserts, a delete for a row we
//! never had (out-of-order arrival) is a successful no-op. A malformed
//! body (missing required field) is the only client-error rejection.

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::post,
};
use deblog_common::error::DeblogResult;
use deblog_db::repository::federated_posts;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::AppState;

/// Federation receiver router. Mounted outside the auth layer.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/federate", post(receive_publish))
        .route("/federate-delete", post(receive_delete))
}

/// Publish event body, as sent by a peer's propagator.
#[derive(Debug, Deserialize)]
struct PublishPayload {
    post_id: i64,
    username: String,
    content: String,
}

/// Delete event body.
#[derive(Debug, Deserialize)]
struct DeletePayload {
    post_id: i64,
}

#[derive(Serialize)]
struct AckResponse {
    message: &'static str,
}

/// POST /federate
///
/// Upsert a federated post keyed by `(origin, post_id)`.
async fn receive_publish(
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<PublishPayload>,
) -> DeblogResult<Json<AckResponse>> {
    let origin = derive_origin(&headers, remote);
    tracing::info!(
        origin = %origin,
        post_id = %body.post_id,
        "Receiving federated post"
    );

    federated_posts::upsert(
        &state.db.pg,
        body.post_id,
        &origin,
        &body.username,
        &body.content,
    )
    .await?;

    Ok(Json(AckResponse {
        message: "Post received",
    }))
}

/// POST /federate-delete
///
/// Remove the federated post for `(origin, post_id)` if we have it.
async fn receive_delete(
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<DeletePayload>,
) -> DeblogResult<Json<AckResponse>> {
    let origin = derive_origin(&headers, remote);

    let removed = federated_posts::delete(&state.db.pg, body.post_id, &origin).await?;
    if removed {
        tracing::info!(origin = %origin, post_id = %body.post_id, "Federated post deleted");
    } else {
        // Delete may outrun its publish; acknowledging keeps the sender simple.
        tracing::debug!(
            origin = %origin,
            post_id = %body.post_id,
            "Delete for unknown federated post — no-op"
        );
    }

    Ok(Json(AckResponse {
        message: "Deletion acknowledged",
    }))
}

/// Derive the origin instance from the transport context.
///
/// Behind a reverse proxy the socket address is the proxy, so the first
/// `X-Forwarded-For` hop wins when present.
fn derive_origin(headers: &HeaderMap, remote: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_hop) = forwarded.split(',').next() {
            let first_hop = first_hop.trim();
            if !first_hop.is_empty() {
                return first_hop.to_owned();
            }
        }
    }
    remote.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::derive_origin;
    use axum::http::HeaderMap;
    use std::net::SocketAddr;

    fn remote() -> SocketAddr {
        "10.1.2.3:4567".parse().unwrap()
    }

    #[test]
    fn prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "blog-b.example, proxy.internal".parse().unwrap(),
        );
        assert_eq!(derive_origin(&headers, remote()), "blog-b.example");
    }

    #[test]
    fn falls_back_to_socket_address() {
        assert_eq!(derive_origin(&HeaderMap::new(), remote()), "10.1.2.3");
    }

    #[test]
    fn ignores_empty_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "".parse().unwrap());
        assert_eq!(derive_origin(&headers, remote()), "10.1.2.3");
    }

    #[test]
    fn port_is_not_part_of_the_origin() {
        assert_eq!(derive_origin(&HeaderMap::new(), remote()), "10.1.2.3");
    }
}
