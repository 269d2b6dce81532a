//! Outbound propagator — fire-and-forget fan-out of events to peers.
//!
//! The request path calls [`Propagator::dispatch`] with a *snapshot* of the
//! peer directory taken at that moment and returns immediately; directory
//! mutations never race in-flight fan-out. Each peer hostname gets its own
//! worker task consuming a sequential queue, which is the ordering
//! discipline: events for one peer are sent strictly in dispatch order
//! (publish before a subsequent delete), while distinct peers proceed
//! concurrently and independently.
//!
//! A delivery attempt is bounded by the configured timeout; a failure or
//! timeout is logged and the event dropped. At-most-once, no retry. Queues
//! are bounded: a peer that stays slower than the publish rate sheds the
//! overflow instead of growing without limit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{error::FederationError, events::FederationEvent};

/// Maximum events queued per peer before new ones are shed.
const QUEUE_CAPACITY: usize = 256;

/// Fans out federation events to peers through per-peer sequential queues.
pub struct Propagator {
    own_hostname: String,
    scheme: String,
    http: Client,
    queues: Mutex<HashMap<String, mpsc::Sender<FederationEvent>>>,
}

impl Propagator {
    /// Create a propagator for this instance.
    ///
    /// `own_hostname` is the public name of this node; it is skipped if it
    /// ever shows up in a peer snapshot. `timeout` bounds each delivery
    /// attempt so a hung peer cannot pile up outstanding requests.
    pub fn new(
        own_hostname: impl Into<String>,
        scheme: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("DeBlog-Federation/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build reqwest client");

        Self {
            own_hostname: own_hostname.into(),
            scheme: scheme.into(),
            http,
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// Enqueue `event` for every peer in the snapshot and return without
    /// waiting for any delivery.
    ///
    /// Queues for hostnames no longer present in the snapshot are dropped
    /// here; their workers drain what is already queued and exit.
    ///
    /// Must be called from within a tokio runtime (worker tasks are spawned
    /// lazily on first dispatch to a peer).
    pub fn dispatch(&self, event: FederationEvent, peers: Vec<String>) {
        let mut queues = self.queues.lock().expect("propagator queue lock poisoned");
        queues.retain(|hostname, _| peers.iter().any(|p| p == hostname));

        for peer in peers {
            if peer.eq_ignore_ascii_case(&self.own_hostname) {
                debug!("Skipping self-federation to {peer}");
                continue;
            }
            let tx = self.sender_for(&mut queues, &peer);
            match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => warn!(
                    "Dropping {} event for post {} to {peer}: delivery queue full",
                    event_name(&event),
                    event.post_id()
                ),
                Err(mpsc::error::TrySendError::Closed(_)) => warn!(
                    "Dropping {} event for post {} to {peer}: delivery queue closed",
                    event_name(&event),
                    event.post_id()
                ),
            }
        }
    }

    /// Get the queue for `peer`, spawning its worker on first use.
    fn sender_for(
        &self,
        queues: &mut HashMap<String, mpsc::Sender<FederationEvent>>,
        peer: &str,
    ) -> mpsc::Sender<FederationEvent> {
        if let Some(tx) = queues.get(peer) {
            return tx.clone();
        }

        let (tx, mut rx) = mpsc::channel::<FederationEvent>(QUEUE_CAPACITY);
        let http = self.http.clone();
        let scheme = self.scheme.clone();
        let hostname = peer.to_owned();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match deliver(&http, &scheme, &hostname, &event).await {
                    Ok(()) => debug!(
                        "Delivered {} event for post {} to {hostname}",
                        event_name(&event),
                        event.post_id()
                    ),
                    Err(e) => warn!(
                        "Dropping {} event for post {} to {hostname}: {e}",
                        event_name(&event),
                        event.post_id()
                    ),
                }
            }
            debug!("Delivery worker for {hostname} stopped");
        });

        queues.insert(peer.to_owned(), tx.clone());
        tx
    }

    #[cfg(test)]
    fn has_queue(&self, peer: &str) -> bool {
        self.queues
            .lock()
            .expect("propagator queue lock poisoned")
            .contains_key(peer)
    }
}

/// One delivery attempt to one peer.
async fn deliver(
    http: &Client,
    scheme: &str,
    peer: &str,
    event: &FederationEvent,
) -> Result<(), FederationError> {
    let url = format!("{scheme}://{peer}{}", event.endpoint());
    let resp = http.post(&url).json(event).send().await?;
    if !resp.status().is_success() {
        return Err(FederationError::PeerRejected(
            peer.to_owned(),
            resp.status().as_u16(),
        ));
    }
    Ok(())
}

fn event_name(event: &FederationEvent) -> &'static str {
    match event {
        FederationEvent::Publish { .. } => "publish",
        FederationEvent::Delete { .. } => "delete",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, routing::post};
    use std::sync::Arc;

    type Received = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

    /// Spin up a stub peer on an ephemeral port; returns its hostname and
    /// the log of (endpoint, body) pairs in arrival order.
    async fn stub_peer() -> (String, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));

        async fn record(
            path: &str,
            state: Received,
            body: serde_json::Value,
        ) -> axum::http::StatusCode {
            state.lock().unwrap().push((path.to_owned(), body));
            axum::http::StatusCode::OK
        }

        let app = Router::new()
            .route(
                "/federate",
                post(|State(s): State<Received>, Json(b): Json<serde_json::Value>| async move {
                    record("/federate", s, b).await
                }),
            )
            .route(
                "/federate-delete",
                post(|State(s): State<Received>, Json(b): Json<serde_json::Value>| async move {
                    record("/federate-delete", s, b).await
                }),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("127.0.0.1:{}", addr.port()), received)
    }

    async fn wait_for(received: &Received, count: usize) {
        for _ in 0..100 {
            if received.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "stub peer received {} events, expected {count}",
            received.lock().unwrap().len()
        );
    }

    fn publish(post_id: i64) -> FederationEvent {
        FederationEvent::Publish {
            post_id,
            username: "alice".into(),
            content: "hello".into(),
        }
    }

    #[tokio::test]
    async fn publish_then_delete_arrive_in_order() {
        let (peer, received) = stub_peer().await;
        let propagator = Propagator::new("blog-a.example", "http", Duration::from_secs(2));

        propagator.dispatch(publish(1), vec![peer.clone()]);
        propagator.dispatch(FederationEvent::Delete { post_id: 1 }, vec![peer]);

        wait_for(&received, 2).await;
        let log = received.lock().unwrap();
        assert_eq!(log[0].0, "/federate");
        assert_eq!(log[1].0, "/federate-delete");
        assert_eq!(log[1].1["post_id"], 1);
    }

    #[tokio::test]
    async fn unreachable_peer_does_not_block_others() {
        let (live, received) = stub_peer().await;
        let propagator = Propagator::new("blog-a.example", "http", Duration::from_millis(500));

        // Port 9 (discard) — nothing listens there.
        propagator.dispatch(publish(5), vec!["127.0.0.1:9".into(), live]);

        wait_for(&received, 1).await;
        let log = received.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1["post_id"], 5);
    }

    #[tokio::test]
    async fn own_hostname_is_skipped() {
        let (peer, received) = stub_peer().await;
        // The stub's address is *this* instance's own name.
        let propagator = Propagator::new(peer.clone(), "http", Duration::from_secs(2));

        propagator.dispatch(publish(3), vec![peer]);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn removed_peer_queue_is_reclaimed() {
        let (peer_a, received_a) = stub_peer().await;
        let (peer_b, received_b) = stub_peer().await;
        let propagator = Propagator::new("blog-a.example", "http", Duration::from_secs(2));

        propagator.dispatch(publish(1), vec![peer_a.clone(), peer_b.clone()]);
        wait_for(&received_a, 1).await;
        assert!(propagator.has_queue(&peer_a));

        // Peer A has since been removed from the directory.
        propagator.dispatch(publish(2), vec![peer_b.clone()]);
        assert!(!propagator.has_queue(&peer_a));
        assert!(propagator.has_queue(&peer_b));

        wait_for(&received_b, 2).await;
    }

    #[tokio::test]
    async fn slow_peer_sheds_overflow_instead_of_queueing_unbounded() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let received = Arc::new(AtomicUsize::new(0));
        // Holds every delivery until the test releases the gate.
        let gate = Arc::new(tokio::sync::Semaphore::new(0));

        let app = Router::new().route(
            "/federate",
            post({
                let received = received.clone();
                let gate = gate.clone();
                move || {
                    let received = received.clone();
                    let gate = gate.clone();
                    async move {
                        gate.acquire().await.unwrap().forget();
                        received.fetch_add(1, Ordering::SeqCst);
                        axum::http::StatusCode::OK
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let peer = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let propagator = Propagator::new("blog-a.example", "http", Duration::from_secs(5));
        let sent = QUEUE_CAPACITY + 10;
        for i in 0..sent {
            propagator.dispatch(publish(i as i64), vec![peer.clone()]);
        }

        gate.add_permits(sent);
        for _ in 0..500 {
            if received.load(Ordering::SeqCst) >= QUEUE_CAPACITY {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        let delivered = received.load(Ordering::SeqCst);
        assert!(delivered >= QUEUE_CAPACITY, "only {delivered} delivered");
        assert!(delivered < sent, "overflow was not shed");
    }

    #[tokio::test]
    async fn snapshot_fans_out_to_every_peer() {
        let (peer_a, received_a) = stub_peer().await;
        let (peer_b, received_b) = stub_peer().await;
        let propagator = Propagator::new("blog-a.example", "http", Duration::from_secs(2));

        propagator.dispatch(publish(8), vec![peer_a, peer_b]);

        wait_for(&received_a, 1).await;
        wait_for(&received_b, 1).await;
        assert_eq!(received_a.lock().unwrap()[0].1["event_type"], "publish");
        assert_eq!(received_b.lock().unwrap()[0].1["event_type"], "publish");
    }
}
