use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::sink::TxnSink;
use crate::stats::{BridgeStats, StatsSnapshot};

/// Application state shared across handlers
pub struct AppState {
    pub sink: Arc<dyn TxnSink>,
    pub stats: Arc<BridgeStats>,
    /// Largest OTLP message accepted after decompression
    pub max_decoded_bytes: usize,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        sink: Arc<dyn TxnSink>,
        stats: Arc<BridgeStats>,
        max_decoded_bytes: usize,
    ) -> Self {
        Self {
            sink,
            stats,
            max_decoded_bytes,
            started_at: Utc::now(),
        }
    }
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Serialize)]
pub struct StatsResponse {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
    #[serde(flatten)]
    pub counters: StatsSnapshot,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        counters: state.stats.snapshot(),
    })
}
