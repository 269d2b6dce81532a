//! Peer directory entry — a remote instance this node federates with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A known peer instance.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Peer {
    pub id: i64,
    /// Unique hostname, e.g. "blog-b.example" or "blog-b.example:5000".
    pub hostname: String,
    pub added_at: DateTime<Utc>,
}

/// Body for peer add/remove requests.
#[derive(Debug, Deserialize, Validate)]
pub struct PeerRequest {
    #[validate(length(min = 1, message = "Hostname is required"))]
    pub hostname: String,
}

/// Response for `GET /peers`.
#[derive(Debug, Serialize)]
pub struct PeerListResponse {
    /// Hostnames in insertion order.
    pub peers: Vec<String>,
}
