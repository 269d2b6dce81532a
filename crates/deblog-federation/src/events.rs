//! Federation event types.
//!
//! The wire protocol between instances is a small closed set of tagged
//! variants rather than free-form dictionaries: every field an event needs
//! is required at the type level, so a malformed payload fails to parse at
//! the boundary instead of deep inside a handler.

use serde::{Deserialize, Serialize};

/// An event sent from the originating instance to each of its peers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event_type", rename_all = "lowercase")]
pub enum FederationEvent {
    /// A new local post exists; peers should materialize it in their caches.
    Publish {
        post_id: i64,
        username: String,
        content: String,
    },
    /// A previously published post was removed; peers should evict it.
    Delete { post_id: i64 },
}

impl FederationEvent {
    /// Peer-facing endpoint path this event is POSTed to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Publish { .. } => "/federate",
            Self::Delete { .. } => "/federate-delete",
        }
    }

    /// The post id the event refers to, for log lines.
    pub fn post_id(&self) -> i64 {
        match self {
            Self::Publish { post_id, .. } | Self::Delete { post_id } => *post_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FederationEvent;

    #[test]
    fn publish_event_wire_shape() {
        let event = FederationEvent::Publish {
            post_id: 42,
            username: "alice".into(),
            content: "hello".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "publish");
        assert_eq!(json["post_id"], 42);
        assert_eq!(json["username"], "alice");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn delete_event_parses() {
        let event: FederationEvent =
            serde_json::from_str(r#"{"event_type":"delete","post_id":7}"#).unwrap();
        assert_eq!(event, FederationEvent::Delete { post_id: 7 });
        assert_eq!(event.endpoint(), "/federate-delete");
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let result: Result<FederationEvent, _> =
            serde_json::from_str(r#"{"event_type":"publish","post_id":1,"username":"a"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let result: Result<FederationEvent, _> =
            serde_json::from_str(r#"{"event_type":"edit","post_id":1}"#);
        assert!(result.is_err());
    }
}
