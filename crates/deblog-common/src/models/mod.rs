//! Data models shared across crates.

pub mod federated_post;
pub mod peer;
pub mod post;
pub mod timeline;
pub mod user;
