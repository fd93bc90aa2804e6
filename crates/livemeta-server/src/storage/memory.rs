//! In-process fallback backend
//!
//! Holds the locale -> record map in memory, zero-valued at start. Used as
//! the primary backend when the database probe fails in production, and as
//! the per-instance fallback record when a primary write fails mid-run.

use anyhow::Result;
use async_trait::async_trait;
use livemeta_core::{BackendKind, LiveData, LiveRecord, Locale};
use tokio::sync::RwLock;

use super::LiveBackend;

#[derive(Default)]
pub struct MemoryBackend {
    data: RwLock<LiveData>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LiveBackend for MemoryBackend {
    async fn load_all(&self) -> Result<LiveData> {
        Ok(self.data.read().await.clone())
    }

    async fn store(&self, locale: Locale, record: &LiveRecord) -> Result<()> {
        self.data.write().await.set(locale, record.clone());
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_zero_valued() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.load_all().await.unwrap(), LiveData::default());
    }

    #[tokio::test]
    async fn store_is_immediately_visible() {
        let backend = MemoryBackend::new();
        let record = LiveRecord {
            enabled: true,
            title: "Culto".to_string(),
            ..Default::default()
        };
        backend.store(Locale::Pt, &record).await.unwrap();
        assert_eq!(backend.load_all().await.unwrap().pt, record);
    }
}
