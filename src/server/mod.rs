//! HTTP API for creating flashcards and fetching mixed-subject practice sets.
//!
//! Routes:
//! - `POST /api/v1/flashcard/create-flashcard`
//! - `GET  /api/v1/flashcard/get-subject?student_id=..&limit=..`
//! - `GET  /health`
//! - `GET  /api-docs`
//!
//! Every request passes through the access log, the per-IP rate limiter and
//! a permissive CORS layer.

mod access_log;
mod cache;
mod handlers;
mod openapi;
mod rate_limit;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{ConnectInfo, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use crate::config::{AppConfig, RateLimitConfig};
use crate::flashcards::{
    FlashcardService, FlashcardStorage, FlashcardStore, LimitPolicy, SubjectClassifier,
};

pub use cache::ResponseCache;
pub use rate_limit::RateLimiter;

/// State shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub service: FlashcardService,
    pub limits: LimitPolicy,
    pub cache: Arc<ResponseCache>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        service: FlashcardService,
        limits: LimitPolicy,
        cache_ttl: Duration,
        rate_limit: &RateLimitConfig,
    ) -> Self {
        Self {
            service,
            limits,
            cache: Arc::new(ResponseCache::new(cache_ttl)),
            rate_limiter: Arc::new(RateLimiter::new(rate_limit)),
        }
    }

    /// Build the file-backed state described by `config`
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let catalog = config.load_catalog().context("Failed to load subject catalog")?;
        log::info!(
            "Subject catalog ready ({} subjects, fallback {:?})",
            catalog.entries().len(),
            catalog.fallback()
        );

        let data_dir = config.resolve_data_dir().context("Failed to get data directory")?;
        let storage = FlashcardStorage::new(data_dir.clone());
        storage
            .init()
            .with_context(|| format!("Failed to initialize storage at {:?}", data_dir))?;
        log::info!("Flashcard storage at {:?}", data_dir);

        let store: Arc<dyn FlashcardStore> = Arc::new(storage);
        let service = FlashcardService::new(store, SubjectClassifier::new(Arc::new(catalog)));

        Ok(Self::new(
            service,
            config.limit_policy(),
            Duration::from_secs(config.cache_ttl_secs),
            &config.rate_limit,
        ))
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/create-flashcard", post(handlers::create_flashcard))
        .route("/get-subject", get(handlers::get_mixed_flashcards))
        .method_not_allowed_fallback(handlers::not_found);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs", get(handlers::api_docs))
        .nest("/api/v1/flashcard", api)
        .method_not_allowed_fallback(handlers::not_found)
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.rate_limiter),
            rate_limit::enforce,
        ))
        .layer(middleware::from_fn(access_log::log_request))
        .with_state(state)
}

/// Best-effort client address: socket peer, then `X-Forwarded-For`, then "unknown"
pub(crate) fn client_ip(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Server handle for managing the server lifecycle.
pub struct FlashcardServer {
    /// Address the server is listening on.
    pub addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl FlashcardServer {
    /// Get the base URL for this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Ask the server to stop accepting connections and drain.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait until the server task ends.
    pub async fn wait(self) -> anyhow::Result<()> {
        self.task.await.context("Server task panicked")??;
        Ok(())
    }
}

/// Bind `addr` and serve the API on a background task.
pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<FlashcardServer> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let addr = listener.local_addr()?;

    log::info!("Server running on http://{}", addr);
    log::info!("API description available at http://{}/api-docs", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                log::info!("Server shutting down");
            })
            .await
    });

    Ok(FlashcardServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Run the server described by `config` until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let addr = config.bind_addr()?;
    let mut server = start_server(state, addr).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    server.stop();
    server.wait().await
}
