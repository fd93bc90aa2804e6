//! File-backed blob store
//!
//! Persists the full locale -> record map as a single JSON object at a
//! fixed path, and doubles as the object root for exported blobs
//! (`live/{locale}-{year}.json`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use livemeta_core::{BackendKind, LiveData, LiveRecord, Locale};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::LiveBackend;

const DATA_FILE: &str = "live-data.json";

pub struct FileStore {
    data_file: PathBuf,
    root: PathBuf,
    // Serializes read-modify-write cycles on the blob
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data_file: root.join(DATA_FILE),
            root,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the persisted map; a missing or unparsable file yields the
    /// zero-value map instead of an error.
    pub async fn load(&self) -> LiveData {
        match tokio::fs::read(&self.data_file).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        "Unparsable data file {}, serving defaults: {}",
                        self.data_file.display(),
                        e
                    );
                    LiveData::default()
                }
            },
            Err(_) => LiveData::default(),
        }
    }

    pub async fn save(&self, data: &LiveData) -> Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        write_atomic(&self.data_file, &json).await
    }

    /// Write an arbitrary blob under the object root
    pub async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.root.join(key);
        write_atomic(&path, bytes).await?;
        tracing::info!("Stored object {} ({} bytes)", key, bytes.len());
        Ok(())
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("Failed to write: {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace: {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl LiveBackend for FileStore {
    async fn load_all(&self) -> Result<LiveData> {
        Ok(self.load().await)
    }

    async fn store(&self, locale: Locale, record: &LiveRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await;
        data.set(locale, record.clone());
        self.save(&data).await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileStore {
        let root = std::env::temp_dir()
            .join("livemeta-tests")
            .join(format!("{}-{}", name, uuid::Uuid::new_v4()));
        FileStore::new(root)
    }

    #[tokio::test]
    async fn missing_file_loads_as_defaults() {
        let store = temp_store("missing");
        assert_eq!(store.load().await, LiveData::default());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_defaults() {
        let store = temp_store("corrupt");
        store.put_object(DATA_FILE, b"{not json").await.unwrap();
        assert_eq!(store.load().await, LiveData::default());
    }

    #[tokio::test]
    async fn store_persists_one_locale_and_keeps_the_other() {
        let store = temp_store("store");

        let record = LiveRecord {
            enabled: true,
            title: "Culto".to_string(),
            ..Default::default()
        };
        store.store(Locale::Pt, &record).await.unwrap();

        let data = store.load().await;
        assert_eq!(data.pt, record);
        assert_eq!(data.es, LiveRecord::default());
    }

    #[tokio::test]
    async fn put_object_creates_nested_keys() {
        let store = temp_store("objects");
        store
            .put_object("live/pt-2026.json", b"{\"acf\":{}}")
            .await
            .unwrap();
        store.put_object("live/pt-2026.json", b"{}").await.unwrap();
    }
}
