//! Federated post model — a post cached locally from a peer instance.
//!
//! Identity is the pair `(origin_instance, remote_id)`: the id the origin
//! assigned plus the hostname the publish event arrived from. Federated
//! posts are untrusted, opaque records with no link to local users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote post materialized in the local federated cache.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FederatedPost {
    /// Local row id (not part of the federation identity).
    pub id: i64,
    /// Post id as assigned by the origin instance.
    pub remote_id: i64,
    /// Hostname of the instance the publish event came from, derived from
    /// the transport context — never from the request body.
    pub origin_instance: String,
    /// Author username as claimed by the origin instance.
    pub origin_username: String,
    pub content: String,
    /// First arrival time on this instance. A republish of the same
    /// identity updates content but keeps this, so the item does not move
    /// in the timeline.
    pub created_at: DateTime<Utc>,
}
