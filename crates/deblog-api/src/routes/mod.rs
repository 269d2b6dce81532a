//! API route modules.

pub mod auth;
pub mod federation;
pub mod health;
pub mod peers;
pub mod posts;
