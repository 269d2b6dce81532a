//! Repository modules — one per entity.

pub mod federated_posts;
pub mod peers;
pub mod posts;
pub mod users;
