// HTTP server - shared state, router and listener

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::downloader::backends::YtDlpBackend;
use crate::downloader::extractors::CliInfoExtractor;
use crate::downloader::tools::ToolManager;
use crate::downloader::Downloader;
use crate::handlers;
use crate::processing::{MediaProcessing, MediaProcessor};
use crate::users::UserStore;

/// Process-wide counters
#[derive(Debug)]
pub struct ServerStats {
    started_at: Instant,
    total_downloads: AtomicU64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_downloads: AtomicU64::new(0),
        }
    }

    pub fn record_download(&self) {
        self.total_downloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_downloads(&self) -> u64 {
        self.total_downloads.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub downloader: Arc<Downloader>,
    pub processor: Arc<dyn MediaProcessing>,
    pub users: UserStore,
    pub tools: Arc<ToolManager>,
    pub stats: Arc<ServerStats>,
}

impl AppState {
    /// Wire the yt-dlp extractor/backend and ffmpeg processor from config
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let extractor = Arc::new(CliInfoExtractor::new(config.extractor.clone()));
        let backend = Arc::new(YtDlpBackend::new(config.extractor.clone()));
        let downloader = Downloader::new(extractor, backend)
            .with_temp_root(config.extractor.temp_root.clone());

        let users = UserStore::connect(&config.database.url).await?;
        let tools = ToolManager::new(
            config.extractor.ytdlp_path.clone(),
            config.media.ffmpeg_path.clone(),
            config.media.ffprobe_path.clone(),
        );

        Ok(Self {
            downloader: Arc::new(downloader),
            processor: Arc::new(MediaProcessor::new(&config.media)),
            users,
            tools: Arc::new(tools),
            stats: Arc::new(ServerStats::new()),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/platforms", get(handlers::platforms))
        .route("/api/detect", post(handlers::detect))
        .route("/api/info", post(handlers::info))
        .route("/api/download", post(handlers::download))
        .route("/api/health", get(handlers::health))
        .route("/api/stats", get(handlers::stats))
        .route("/api/tools", get(handlers::tools))
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
