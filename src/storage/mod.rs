//! Redis storage layer for users, sessions, and posts.
//!
//! All functions are async and use redis::AsyncCommands.
//! Data is serialized to JSON for storage in Redis.

pub mod post;
pub mod session;
pub mod user;
