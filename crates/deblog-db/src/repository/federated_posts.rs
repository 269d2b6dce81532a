//! Federated cache repository.
//!
//! At most one live row per `(origin_instance, remote_id)` pair. Both
//! mutations are idempotent: re-receiving a publish upserts (last received
//! wins), deleting a missing row is a no-op. Postgres row locks on the
//! unique key serialize concurrent writes to the same pair.

use deblog_common::models::federated_post::FederatedPost;
use sqlx::PgPool;

/// Upsert a federated post keyed by `(origin_instance, remote_id)`.
///
/// A republish of the same identity replaces content and username but keeps
/// the original arrival timestamp, so the item holds its timeline position.
pub async fn upsert(
    pool: &PgPool,
    remote_id: i64,
    origin_instance: &str,
    origin_username: &str,
    content: &str,
) -> Result<FederatedPost, sqlx::Error> {
    sqlx::query_as::<_, FederatedPost>(
        r#"
        INSERT INTO federated_posts (remote_id, origin_instance, origin_username, content)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (origin_instance, remote_id)
        DO UPDATE SET
            origin_username = EXCLUDED.origin_username,
            content = EXCLUDED.content
        RETURNING *
        "#,
    )
    .bind(remote_id)
    .bind(origin_instance)
    .bind(origin_username)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Remove the federated post for `(origin_instance, remote_id)` if present.
///
/// Returns whether a row was removed. Zero rows is still success — a delete
/// event may arrive before (or instead of) its publish.
pub async fn delete(
    pool: &PgPool,
    remote_id: i64,
    origin_instance: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM federated_posts WHERE remote_id = $1 AND origin_instance = $2",
    )
    .bind(remote_id)
    .bind(origin_instance)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Full scan of the federated cache for the timeline aggregator.
pub async fn list_all(pool: &PgPool) -> Result<Vec<FederatedPost>, sqlx::Error> {
    sqlx::query_as::<_, FederatedPost>("SELECT * FROM federated_posts")
        .fetch_all(pool)
        .await
}
