//! Peer directory repository.
//!
//! The directory is the single source of truth the propagator snapshots;
//! every add/remove commits before the HTTP response returns.

use deblog_common::models::peer::Peer;
use sqlx::PgPool;

/// Insert a peer. Returns `Ok(None)` if the hostname is already present.
pub async fn add(pool: &PgPool, hostname: &str) -> Result<Option<Peer>, sqlx::Error> {
    sqlx::query_as::<_, Peer>(
        r#"
        INSERT INTO peers (hostname)
        VALUES ($1)
        ON CONFLICT (hostname) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(hostname)
    .fetch_optional(pool)
    .await
}

/// Remove a peer by hostname. Returns whether a row was removed.
pub async fn remove(pool: &PgPool, hostname: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM peers WHERE hostname = $1")
        .bind(hostname)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// List peer hostnames in insertion order (stable across restarts).
pub async fn list_hostnames(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT hostname FROM peers ORDER BY added_at, id")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(h,)| h).collect())
}
