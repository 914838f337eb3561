use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, stats, AppState};
use crate::otel::handle_otlp_traces;
use crate::sink::{ObjectStoreSink, QueuedSink, SinkConfig, TxnSink};
use crate::stats::BridgeStats;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Limit on the request body as received
    pub max_body_bytes: usize,
    /// Limit on the OTLP message after gzip decompression
    pub max_decoded_bytes: usize,
    pub sink: SinkConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            max_body_bytes: 16 * 1024 * 1024, // 16MB
            max_decoded_bytes: 64 * 1024 * 1024, // 64MB
            sink: SinkConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a server config from environment variables
    /// TXNBRIDGE_HOST=0.0.0.0
    /// TXNBRIDGE_PORT=9000
    /// TXNBRIDGE_MAX_BODY_BYTES=16777216
    /// TXNBRIDGE_MAX_DECODED_BYTES=67108864
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("TXNBRIDGE_HOST").unwrap_or(defaults.host);
        let port = std::env::var("TXNBRIDGE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let max_body_bytes = std::env::var("TXNBRIDGE_MAX_BODY_BYTES")
            .ok()
            .and_then(|b| b.parse().ok())
            .unwrap_or(defaults.max_body_bytes);
        let max_decoded_bytes = std::env::var("TXNBRIDGE_MAX_DECODED_BYTES")
            .ok()
            .and_then(|b| b.parse().ok())
            .unwrap_or(defaults.max_decoded_bytes);

        Self {
            host,
            port,
            max_body_bytes,
            max_decoded_bytes,
            sink: SinkConfig::from_env(),
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // OTLP ingest
        .route("/v1/traces", post(handle_otlp_traces))
        // Stats
        .route("/stats", get(stats))
        // Middleware
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stats = Arc::new(BridgeStats::new());

    // Initialize sink
    let store: Arc<dyn TxnSink> =
        Arc::new(ObjectStoreSink::new(&config.sink, Arc::clone(&stats))?);
    let queue = if config.sink.is_queued() {
        Some(Arc::new(QueuedSink::start(
            store.clone(),
            config.sink.queue_capacity,
            config.sink.queue_workers,
            Arc::clone(&stats),
        )))
    } else {
        tracing::info!("Delivering records inline");
        None
    };
    let sink: Arc<dyn TxnSink> = match &queue {
        Some(queue) => queue.clone(),
        None => store,
    };

    // Initialize app state
    let state = Arc::new(AppState::new(sink, stats, config.max_decoded_bytes));

    // Build router
    let app = build_router(state, config.max_body_bytes);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("bridge listening {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Deliver whatever is still queued
    if let Some(queue) = queue {
        queue.close().await;
    }

    tracing::info!("Bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, draining...");
}
