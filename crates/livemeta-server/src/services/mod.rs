//! Business logic services

pub mod auth;
pub mod live_store;
pub mod metrics;

pub use auth::AuthService;
pub use live_store::LiveStore;
pub use metrics::MetricsRegistry;
