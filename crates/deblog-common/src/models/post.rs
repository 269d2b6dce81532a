//! Local post model.
//!
//! A post is owned by exactly one local user (`author_id` is a foreign key).
//! The only mutation after creation is a hard delete by its owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A post authored on this instance.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Post creation request body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "Post content cannot be empty"))]
    pub content: String,
}

/// Response for a freshly created post.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            content: p.content,
            created_at: p.created_at,
        }
    }
}
