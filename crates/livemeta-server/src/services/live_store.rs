//! Data-access layer for live-stream metadata
//!
//! Serves reads through a short-lived cache over an injected backend, and
//! absorbs backend failures into an in-process fallback record. Reads and
//! writes never surface a backend error to the caller; they degrade.

use crate::storage::{LiveBackend, MemoryBackend};
use livemeta_core::{Environment, LiveData, LivePatch, LiveRecord, Locale, StorageStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// How long a loaded map may be served without reconsulting the backend.
/// Short enough to bound staleness for public readers, long enough to
/// absorb read bursts.
const CACHE_TTL: Duration = Duration::from_secs(1);

struct CacheEntry {
    data: LiveData,
    loaded_at: Instant,
}

/// Result of a write: the merged record that was persisted, and whether
/// the in-process fallback had to absorb it
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub record: LiveRecord,
    pub used_fallback: bool,
}

pub struct LiveStore {
    primary: Arc<dyn LiveBackend>,
    // In-process record written when the primary backend rejects a write
    fallback: MemoryBackend,
    cache: RwLock<Option<CacheEntry>>,
    degraded: AtomicBool,
    environment: Environment,
    database_available: bool,
}

impl LiveStore {
    pub fn new(
        primary: Arc<dyn LiveBackend>,
        environment: Environment,
        database_available: bool,
    ) -> Self {
        Self {
            primary,
            fallback: MemoryBackend::new(),
            cache: RwLock::new(None),
            degraded: AtomicBool::new(false),
            environment,
            database_available,
        }
    }

    pub async fn get_record(&self, locale: Locale) -> LiveRecord {
        self.load().await.get(locale).clone()
    }

    pub async fn get_all(&self) -> LiveData {
        self.load().await
    }

    /// Merge `patch` into the current record for `locale` and persist it.
    ///
    /// Never fails: a primary-backend write failure is absorbed by the
    /// in-process fallback record. The cache is invalidated on every path
    /// so the next read reflects the write.
    pub async fn update(&self, locale: Locale, patch: &LivePatch) -> UpdateOutcome {
        let mut record = self.load().await.get(locale).clone();
        patch.apply(&mut record);

        let used_fallback = match self.primary.store(locale, &record).await {
            Ok(()) => {
                debug!("Persisted {} record via {}", locale, self.primary.kind());
                self.degraded.store(false, Ordering::Relaxed);
                false
            }
            Err(e) => {
                warn!(
                    "Backend write for {} failed, using in-process fallback: {:#}",
                    locale, e
                );
                // MemoryBackend writes cannot fail
                let _ = self.fallback.store(locale, &record).await;
                self.degraded.store(true, Ordering::Relaxed);
                true
            }
        };

        self.invalidate().await;

        UpdateOutcome {
            record,
            used_fallback,
        }
    }

    pub fn status(&self) -> StorageStatus {
        let degraded = self.degraded.load(Ordering::Relaxed);
        StorageStatus {
            environment: self.environment,
            backend: if degraded {
                livemeta_core::BackendKind::Memory
            } else {
                self.primary.kind()
            },
            database_available: self.database_available,
            degraded,
        }
    }

    /// Drop the cache entry; the next read reloads from the backend
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn load(&self) -> LiveData {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.loaded_at.elapsed() < CACHE_TTL {
                    return entry.data.clone();
                }
            }
        }

        let data = self.reload().await;
        *self.cache.write().await = Some(CacheEntry {
            data: data.clone(),
            loaded_at: Instant::now(),
        });
        data
    }

    async fn reload(&self) -> LiveData {
        if self.degraded.load(Ordering::Relaxed) {
            // Fallback writes must be immediately visible
            return self.fallback.load_all().await.unwrap_or_default();
        }

        match self.primary.load_all().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Backend read failed, serving in-process data: {:#}", e);
                self.fallback.load_all().await.unwrap_or_default()
            }
        }
    }
}
