//! txnbridge server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - TXNBRIDGE_HOST: Bind address (default: 0.0.0.0)
//! - TXNBRIDGE_PORT: Port number (default: 9000)
//! - TXNBRIDGE_MAX_BODY_BYTES: Largest accepted OTLP body (default: 16 MiB)
//! - TXNBRIDGE_MAX_DECODED_BYTES: Largest OTLP message after gzip decompression (default: 64 MiB)
//! - TXNBRIDGE_STORE_URL: Object store base URL (default: http://weaviate:8080)
//! - TXNBRIDGE_STORE_CLASS: Object class for records (default: FinancialTxn)
//! - TXNBRIDGE_STORE_TIMEOUT_SECS: Per-write timeout (default: 10)
//! - TXNBRIDGE_QUEUE_CAPACITY: Bounded delivery queue size, 0 = inline (default: 0)
//! - TXNBRIDGE_QUEUE_WORKERS: Delivery workers when queued (default: CPU count)
//! - RUST_LOG: Log level (default: info)
//!
//! Dropped records are logged on the `txnbridge::dead_letter` target.

use txnbridge::api::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "txnbridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    tracing::info!("txnbridge configuration:");
    tracing::info!("  Listen: {}:{}", config.host, config.port);
    tracing::info!("  Max body: {} bytes", config.max_body_bytes);
    tracing::info!("  Max decoded body: {} bytes", config.max_decoded_bytes);
    tracing::info!("  Object store: {}", config.sink.objects_url());
    tracing::info!("  Class: {}", config.sink.class_name);
    tracing::info!("  Store timeout: {:?}", config.sink.timeout);
    if config.sink.is_queued() {
        tracing::info!(
            "  Delivery: QUEUED (capacity {}, {} workers)",
            config.sink.queue_capacity,
            config.sink.queue_workers
        );
    } else {
        tracing::info!("  Delivery: INLINE");
    }

    run_server(config).await
}
