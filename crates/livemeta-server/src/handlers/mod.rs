//! HTTP handlers

pub mod admin;
pub mod auth;
pub mod health;
pub mod live;
pub mod metrics;

pub use health::health;
