//! Post routes — create, delete, and the public merged timeline.
//!
//! Create and delete return as soon as the local write commits; propagation
//! to peers is handed to the propagator with a snapshot of the peer
//! directory and never awaited, so a dead peer cannot fail or slow the
//! request.

use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use deblog_common::{
    error::{DeblogError, DeblogResult},
    models::{
        post::{CreatePostRequest, PostResponse},
        timeline::{TimelineItem, merge_timeline},
    },
    validation::validate_request,
};
use deblog_db::repository::{federated_posts, peers, posts};
use deblog_federation::FederationEvent;
use std::sync::Arc;

use crate::{AppState, middleware::AuthContext};

/// Post routes. The timeline read is public; mutations require auth.
pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new().route("/posts", get(get_timeline));

    let authed = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{id}", delete(delete_post))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(authed)
}

/// POST /posts
///
/// Create a post for the authenticated user, then fire a publish event at
/// every current peer.
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreatePostRequest>,
) -> DeblogResult<(StatusCode, Json<PostResponse>)> {
    validate_request(&body)?;
    if body.content.trim().is_empty() {
        return Err(DeblogError::Validation {
            message: "Post content cannot be empty".into(),
        });
    }

    let post = posts::create_post(&state.db.pg, auth.user_id, &body.content).await?;
    tracing::info!(post_id = %post.id, user_id = %auth.user_id, "Post created");

    propagate(
        &state,
        FederationEvent::Publish {
            post_id: post.id,
            username: auth.username,
            content: post.content.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// DELETE /posts/{id}
///
/// Delete the caller's own post, then fire a delete event at every current
/// peer. Deleting someone else's post is forbidden.
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<i64>,
) -> DeblogResult<StatusCode> {
    match posts::delete_owned(&state.db.pg, post_id, auth.user_id).await? {
        posts::DeleteOutcome::NotFound => {
            return Err(DeblogError::NotFound {
                resource: "Post".into(),
            });
        }
        posts::DeleteOutcome::NotOwner => return Err(DeblogError::Forbidden),
        posts::DeleteOutcome::Deleted => {}
    }

    tracing::info!(post_id = %post_id, user_id = %auth.user_id, "Post deleted");

    propagate(&state, FederationEvent::Delete { post_id }).await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /posts
///
/// The public timeline: local posts and federated posts merged, newest
/// first, rebuilt from both stores on every call.
async fn get_timeline(State(state): State<Arc<AppState>>) -> DeblogResult<Json<Vec<TimelineItem>>> {
    let local = posts::list_with_authors(&state.db.pg)
        .await?
        .into_iter()
        .map(|p| TimelineItem::local(p.id, p.username, p.content, p.created_at))
        .collect();

    let federated = federated_posts::list_all(&state.db.pg)
        .await?
        .into_iter()
        .map(TimelineItem::federated)
        .collect();

    Ok(Json(merge_timeline(local, federated)))
}

/// Snapshot the peer directory and hand the event to the propagator.
///
/// Reading the snapshot is the only await; delivery itself runs in the
/// propagator's worker tasks. A failed snapshot read only costs this
/// event's propagation — the post mutation has already committed.
async fn propagate(state: &AppState, event: FederationEvent) {
    match peers::list_hostnames(&state.db.pg).await {
        Ok(peer_snapshot) => state.propagator.dispatch(event, peer_snapshot),
        Err(e) => tracing::warn!("Skipping propagation, failed to read peer directory: {e}"),
    }
}
