//! Livemeta Core - Pure type definitions
//!
//! Data types shared between the server and any future clients: locales,
//! live-stream records, update patches and storage status. No async runtime
//! dependencies.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
