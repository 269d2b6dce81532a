//! Timeline view — the merged, ordered projection of local and federated posts.
//!
//! Items are produced fresh on every read; nothing here is persisted or
//! cached across requests. Ordering is descending by `created_at` with a
//! deterministic tie-break so repeated reads over the same data always
//! return the same sequence.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::federated_post::FederatedPost;

/// Discriminator tag on a timeline item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSource {
    Federated,
    Local,
}

/// One entry in the merged timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineItem {
    pub source: TimelineSource,
    /// Post id — local id for local items, origin-assigned id for federated.
    pub id: i64,
    pub username: String,
    /// Origin hostname; present only on federated items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_instance: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TimelineItem {
    /// Project a local post (already joined with its author's username).
    pub fn local(id: i64, username: String, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            source: TimelineSource::Local,
            id,
            username,
            origin_instance: None,
            content,
            created_at,
        }
    }

    pub fn federated(post: FederatedPost) -> Self {
        Self {
            source: TimelineSource::Federated,
            id: post.remote_id,
            username: post.origin_username,
            origin_instance: Some(post.origin_instance),
            content: post.content,
            created_at: post.created_at,
        }
    }
}

/// Merge local and federated items into one timeline.
///
/// Sorts descending by `created_at`. Exact-timestamp ties are broken by
/// `(source, id desc, origin_instance)` — an arbitrary but fixed rule, so
/// the result is stable across repeated calls over the same data. Callers
/// must not rely on which side of a tie wins, only on determinism.
pub fn merge_timeline(
    local: Vec<TimelineItem>,
    federated: Vec<TimelineItem>,
) -> Vec<TimelineItem> {
    let mut items: Vec<TimelineItem> = local;
    items.extend(federated);
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| b.id.cmp(&a.id))
            .then_with(|| a.origin_instance.cmp(&b.origin_instance))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn fed(remote_id: i64, origin: &str, secs: i64) -> TimelineItem {
        TimelineItem::federated(FederatedPost {
            id: remote_id,
            remote_id,
            origin_instance: origin.to_owned(),
            origin_username: "bob".to_owned(),
            content: "hi".to_owned(),
            created_at: at(secs),
        })
    }

    #[test]
    fn newest_first() {
        let local = vec![
            TimelineItem::local(1, "alice".into(), "old".into(), at(10)),
            TimelineItem::local(2, "alice".into(), "new".into(), at(30)),
        ];
        let federated = vec![fed(7, "blog-b.example", 20)];

        let merged = merge_timeline(local, federated);
        let times: Vec<_> = merged.iter().map(|i| i.created_at).collect();
        assert_eq!(times, vec![at(30), at(20), at(10)]);
    }

    #[test]
    fn descending_invariant_holds_with_ties() {
        let local = vec![
            TimelineItem::local(1, "alice".into(), "a".into(), at(20)),
            TimelineItem::local(2, "alice".into(), "b".into(), at(20)),
        ];
        let federated = vec![fed(1, "blog-b.example", 20), fed(9, "blog-c.example", 5)];

        let merged = merge_timeline(local, federated);
        for pair in merged.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn ties_are_deterministic_regardless_of_input_order() {
        let a = || TimelineItem::local(1, "alice".into(), "a".into(), at(20));
        let b = || TimelineItem::local(2, "alice".into(), "b".into(), at(20));
        let f1 = || fed(1, "blog-b.example", 20);
        let f2 = || fed(1, "blog-c.example", 20);

        let first = merge_timeline(vec![a(), b()], vec![f1(), f2()]);
        let second = merge_timeline(vec![b(), a()], vec![f2(), f1()]);

        let key = |i: &TimelineItem| (i.source, i.id, i.origin_instance.clone());
        assert_eq!(
            first.iter().map(key).collect::<Vec<_>>(),
            second.iter().map(key).collect::<Vec<_>>()
        );
    }

    #[test]
    fn federated_item_carries_origin() {
        let merged = merge_timeline(vec![], vec![fed(42, "blog-b.example", 1)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 42);
        assert_eq!(merged[0].origin_instance.as_deref(), Some("blog-b.example"));
        assert_eq!(merged[0].username, "bob");
    }
}
