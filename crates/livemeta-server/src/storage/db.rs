//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use livemeta_core::{BackendKind, LiveData, LiveRecord, Locale};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::LiveBackend;

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        tracing::info!("SQLite connection established, running migrations...");

        // Run migrations (inline for simplicity)
        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS live_data (
                language TEXT PRIMARY KEY,
                enabled INTEGER NOT NULL DEFAULT 0,
                title TEXT NOT NULL DEFAULT '',
                video_id TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Seed zero-value rows so every known locale always has a record
        for locale in Locale::ALL {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO live_data (language) VALUES (?1)
                "#,
            )
            .bind(locale.as_str())
            .execute(pool)
            .await?;
        }

        Ok(())
    }

    /// Trivial liveness probe
    pub async fn probe(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&*self.pool).await?;
        Ok(())
    }

    pub async fn upsert_record(&self, locale: Locale, record: &LiveRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO live_data (language, enabled, title, video_id, description, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT (language) DO UPDATE SET
                enabled = excluded.enabled,
                title = excluded.title,
                video_id = excluded.video_id,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(locale.as_str())
        .bind(record.enabled)
        .bind(&record.title)
        .bind(&record.video_id)
        .bind(&record.description)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn select_record(&self, locale: Locale) -> Result<LiveRecord> {
        let row: Option<LiveRow> = sqlx::query_as(
            r#"
            SELECT language, enabled, title, video_id, description
            FROM live_data WHERE language = ?1
            "#,
        )
        .bind(locale.as_str())
        .fetch_optional(&*self.pool)
        .await?;

        // A missing row is the zero-value record, never an error
        Ok(row.map(|r| r.into()).unwrap_or_default())
    }

    pub async fn select_all(&self) -> Result<LiveData> {
        let rows: Vec<LiveRow> = sqlx::query_as(
            r#"
            SELECT language, enabled, title, video_id, description
            FROM live_data ORDER BY language
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        let mut data = LiveData::default();
        for row in rows {
            if let Ok(locale) = row.language.parse::<Locale>() {
                data.set(locale, row.into());
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl LiveBackend for Database {
    async fn load_all(&self) -> Result<LiveData> {
        self.select_all().await
    }

    async fn store(&self, locale: Locale, record: &LiveRecord) -> Result<()> {
        self.upsert_record(locale, record).await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Database
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct LiveRow {
    language: String,
    enabled: bool,
    title: String,
    video_id: String,
    description: String,
}

impl From<LiveRow> for LiveRecord {
    fn from(r: LiveRow) -> Self {
        LiveRecord {
            enabled: r.enabled,
            title: r.title,
            video_id: r.video_id,
            description: r.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_database(name: &str) -> Database {
        let path = std::env::temp_dir()
            .join("livemeta-tests")
            .join(format!("{}-{}.db", name, uuid::Uuid::new_v4()));
        Database::new(&path.to_string_lossy()).await.unwrap()
    }

    #[tokio::test]
    async fn migrations_seed_zero_value_rows() {
        let db = temp_database("seed").await;

        let data = db.select_all().await.unwrap();
        assert_eq!(data.pt, LiveRecord::default());
        assert_eq!(data.es, LiveRecord::default());
    }

    #[tokio::test]
    async fn probe_answers_on_live_connection() {
        let db = temp_database("probe").await;
        db.probe().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_then_select_round_trips() {
        let db = temp_database("upsert").await;

        let record = LiveRecord {
            enabled: true,
            title: "Culto".to_string(),
            video_id: "abc123".to_string(),
            description: "domingo".to_string(),
        };
        db.upsert_record(Locale::Pt, &record).await.unwrap();

        assert_eq!(db.select_record(Locale::Pt).await.unwrap(), record);
        // Other locale untouched
        assert_eq!(
            db.select_record(Locale::Es).await.unwrap(),
            LiveRecord::default()
        );
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_row() {
        let db = temp_database("overwrite").await;

        let first = LiveRecord {
            title: "first".to_string(),
            ..Default::default()
        };
        let second = LiveRecord {
            title: "second".to_string(),
            enabled: true,
            ..Default::default()
        };
        db.upsert_record(Locale::Es, &first).await.unwrap();
        db.upsert_record(Locale::Es, &second).await.unwrap();

        assert_eq!(db.select_record(Locale::Es).await.unwrap(), second);
    }
}
