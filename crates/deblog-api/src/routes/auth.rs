//! Authentication routes — register and login.
//!
//! Accounts are local to this instance; federation never creates accounts.

use axum::{Json, Router, extract::State, routing::post};
use deblog_common::{
    error::{DeblogError, DeblogResult},
    models::user::{CreateUserRequest, LoginRequest, UserResponse},
    validation::validate_request,
};
use deblog_db::repository::users;
use serde::Serialize;
use std::sync::Arc;

use crate::{AppState, auth};

/// Auth router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Serialize)]
struct LoginResponse {
    user: UserResponse,
    token: String,
}

/// POST /auth/register
///
/// Create a new account. Returns the public user profile.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> DeblogResult<Json<UserResponse>> {
    validate_request(&body)?;

    let password_hash = auth::hash_password(&body.password)
        .map_err(|e| DeblogError::Internal(anyhow::anyhow!("{e}")))?;

    // The unique index is the real guard; two concurrent registrations of
    // the same name race down to one winner.
    let user = match users::create_user(&state.db.pg, &body.username, &password_hash).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(DeblogError::AlreadyExists {
                resource: "Username".into(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "New user registered");

    Ok(Json(user.into()))
}

/// POST /auth/login
///
/// Authenticate with username + password. Returns a JWT access token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> DeblogResult<Json<LoginResponse>> {
    validate_request(&body)?;

    // Unknown username and wrong password are indistinguishable to the caller.
    let user = users::find_by_username(&state.db.pg, &body.username)
        .await?
        .ok_or(DeblogError::InvalidCredentials)?;

    let valid = auth::verify_password(&body.password, &user.password_hash)
        .map_err(|_| DeblogError::InvalidCredentials)?;
    if !valid {
        return Err(DeblogError::InvalidCredentials);
    }

    let config = deblog_common::config::get();
    let token = auth::generate_access_token(
        user.id,
        &user.username,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
    )
    .map_err(|e| DeblogError::Internal(e.into()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user: user.into(),
        token,
    }))
}
