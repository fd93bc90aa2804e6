//! Livemeta Server
//!
//! Internal admin service for live-stream metadata: an authenticated edit
//! surface over two locales, public read endpoints for the front-end, and
//! an in-memory request-metrics dashboard.
//!
//! Uses SQLite (embedded) instead of PostgreSQL for the production backend.

mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use livemeta_core::Environment;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use services::{AuthService, LiveStore, MetricsRegistry};
use storage::{Database, FileStore, LiveBackend, MemoryBackend};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub live: Arc<LiveStore>,
    pub metrics: Arc<MetricsRegistry>,
    pub auth: Arc<AuthService>,
    pub objects: Arc<FileStore>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Livemeta Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    info!(
        "Config loaded: env={}, bind={}, data_dir={}",
        config.environment,
        config.bind_address,
        config.data_dir.display()
    );

    // Select the persistence backend for this deployment
    let (backend, database_available) = select_backend(&config).await;
    info!("Using {} backend", backend.kind());

    // Initialize services
    let live = Arc::new(LiveStore::new(
        backend,
        config.environment,
        database_available,
    ));
    let metrics = Arc::new(MetricsRegistry::new());
    let auth = Arc::new(AuthService::new(
        config.admin_username.clone(),
        config.admin_password.clone(),
    ));
    let objects = Arc::new(FileStore::new(config.data_dir.clone()));
    info!("Services initialized");

    let state = AppState {
        live,
        metrics,
        auth,
        objects,
    };

    let app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Public read surface
        .route("/live/pt", get(handlers::live::get_pt))
        .route("/live/es", get(handlers::live::get_es))
        .route("/live/all", get(handlers::live::get_all))
        .route("/metrics", get(handlers::metrics::snapshot))
        // Admin surface (session-cookie gated)
        .route("/live/update", post(handlers::live::update))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/admin/status", get(handlers::admin::status))
        .route("/admin/reload", post(handlers::admin::reload))
        .route("/admin/export", post(handlers::admin::export))
}

/// Production deployments use the database when it answers its probe and
/// degrade to the in-process record otherwise; everything else persists to
/// the single-blob file store.
async fn select_backend(config: &Config) -> (Arc<dyn LiveBackend>, bool) {
    match config.environment {
        Environment::Production => match Database::new(&config.database_path).await {
            Ok(db) => match db.probe().await {
                Ok(()) => {
                    let backend: Arc<dyn LiveBackend> = Arc::new(db);
                    (backend, true)
                }
                Err(e) => {
                    warn!("Database probe failed, using in-process records: {:#}", e);
                    let backend: Arc<dyn LiveBackend> = Arc::new(MemoryBackend::new());
                    (backend, false)
                }
            },
            Err(e) => {
                warn!("Database unavailable, using in-process records: {:#}", e);
                let backend: Arc<dyn LiveBackend> = Arc::new(MemoryBackend::new());
                (backend, false)
            }
        },
        Environment::Development => {
            let backend: Arc<dyn LiveBackend> = Arc::new(FileStore::new(config.data_dir.clone()));
            (backend, false)
        }
    }
}

#[derive(Debug, Clone)]
struct Config {
    environment: Environment,
    bind_address: String,
    data_dir: PathBuf,
    database_path: String,
    admin_username: String,
    admin_password: String,
}

fn load_config() -> Result<Config> {
    let environment = std::env::var("APP_ENV")
        .map(|v| Environment::from_env_value(&v))
        .unwrap_or(Environment::Development);

    let data_dir = std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"));

    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
        data_dir.join("livemeta.db").to_string_lossy().to_string()
    });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let admin_username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        warn!("ADMIN_PASSWORD not set, using default (insecure for production)");
        "change-me-in-production".to_string()
    });

    Ok(Config {
        environment,
        bind_address,
        data_dir,
        database_path,
        admin_username,
        admin_password,
    })
}
