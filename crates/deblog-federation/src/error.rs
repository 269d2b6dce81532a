//! Federation-specific error types.
//!
//! These never cross the propagation boundary: delivery failures are logged
//! inside the worker tasks and dropped, never surfaced to the request that
//! created or deleted the post.

use thiserror::Error;

/// Errors that can occur delivering an event to a peer.
#[derive(Debug, Error)]
pub enum FederationError {
    #[error("Peer '{0}' is not reachable: {1}")]
    PeerUnreachable(String, String),

    #[error("Peer '{0}' rejected the event with status {1}")]
    PeerRejected(String, u16),
}

impl From<reqwest::Error> for FederationError {
    fn from(e: reqwest::Error) -> Self {
        let peer = e
            .url()
            .and_then(|u| u.host_str().map(ToOwned::to_owned))
            .unwrap_or_default();
        FederationError::PeerUnreachable(peer, e.to_string())
    }
}
