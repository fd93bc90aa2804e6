//! Storage layer
//!
//! Uses SQLite (embedded) instead of PostgreSQL for the relational backend,
//! a single JSON blob on disk for the file backend, and an in-process map
//! as the fallback when the database is unreachable.

pub mod db;
pub mod file;
pub mod memory;

pub use db::Database;
pub use file::FileStore;
pub use memory::MemoryBackend;

use anyhow::Result;
use async_trait::async_trait;
use livemeta_core::{BackendKind, LiveData, LiveRecord, Locale};

/// A persistence backend for the locale -> record map
///
/// All three implementations share the same contract: `load_all` returns a
/// record for every known locale (missing data materializes as the zero
/// value), and `store` persists one locale's record.
#[async_trait]
pub trait LiveBackend: Send + Sync {
    async fn load_all(&self) -> Result<LiveData>;

    async fn store(&self, locale: Locale, record: &LiveRecord) -> Result<()>;

    fn kind(&self) -> BackendKind;
}
