//! Post repository — local posts and their author join for the timeline.

use chrono::{DateTime, Utc};
use deblog_common::models::post::Post;
use sqlx::PgPool;

/// Create a new local post.
pub async fn create_post(
    pool: &PgPool,
    author_id: i64,
    content: &str,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (author_id, content)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(author_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// A local post joined with its author's username, ready for the timeline.
#[derive(Debug, sqlx::FromRow)]
pub struct PostWithAuthor {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fetch all local posts with their author usernames.
pub async fn list_with_authors(pool: &PgPool) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.id, u.username, p.content, p.created_at
        FROM posts p
        JOIN users u ON u.id = p.author_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Outcome of an owner-checked delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    NotOwner,
}

/// Delete a post after verifying ownership, in one transaction.
///
/// The ownership read and the delete commit together, so a racing delete
/// by another request cannot slip between the check and the removal.
pub async fn delete_owned(
    pool: &PgPool,
    post_id: i64,
    user_id: i64,
) -> Result<DeleteOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let author: Option<(i64,)> =
        sqlx::query_as("SELECT author_id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;

    let outcome = match author {
        None => DeleteOutcome::NotFound,
        Some((author_id,)) if author_id != user_id => DeleteOutcome::NotOwner,
        Some(_) => {
            sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(post_id)
                .execute(&mut *tx)
                .await?;
            DeleteOutcome::Deleted
        }
    };

    tx.commit().await?;
    Ok(outcome)
}
