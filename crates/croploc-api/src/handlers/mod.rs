//! HTTP handlers.

pub mod health;
pub mod sessions;

pub use health::{health, ready};
