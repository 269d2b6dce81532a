//! # deblog-federation
//!
//! Outbound federation layer: delivers publish and delete events to the
//! peers in this node's directory.
//!
//! ## Delivery semantics
//!
//! Propagation is best-effort, at-most-once, and fully decoupled from the
//! request that triggered it. There is no durable outbox and no retry: a
//! peer that is down simply misses the event. This is the documented
//! accepted-loss policy of the protocol, not an oversight.
//!
//! ```text
//!  blog-a.example                       blog-b.example
//!       │                                     │
//!       ├── POST /federate {post…} ─────────► │  (publish event)
//!       ├── POST /federate-delete {post_id} ► │  (delete event)
//!       │                                     │
//! ```
//!
//! ## Ordering
//!
//! Events for the same peer are sent through a per-peer sequential queue
//! ([`propagator::Propagator`]), so a publish can never be reordered after
//! the delete that follows it. Distinct peers are independent: one hung
//! peer delays only its own queue.

pub mod error;
pub mod events;
pub mod propagator;

pub use error::FederationError;
pub use events::FederationEvent;
pub use propagator::Propagator;
