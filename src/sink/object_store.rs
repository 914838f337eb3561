//! HTTP sink for the object store's `/v1/objects` write API

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::{dead_letter, SinkConfig, SinkError, TxnSink};
use crate::stats::BridgeStats;
use crate::txn::{FinancialTxn, ObjectEnvelope};

/// Writes each record as one object via `POST {base_url}/v1/objects`
#[derive(Debug, Clone)]
pub struct ObjectStoreSink {
    client: reqwest::Client,
    objects_url: String,
    class_name: String,
    stats: Arc<BridgeStats>,
}

impl ObjectStoreSink {
    pub fn new(config: &SinkConfig, stats: Arc<BridgeStats>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SinkError::Client(e.to_string()))?;

        Ok(Self {
            client,
            objects_url: config.objects_url(),
            class_name: config.class_name.clone(),
            stats,
        })
    }

    /// Send one record, reporting any failure
    pub async fn try_save(&self, txn: &FinancialTxn) -> Result<(), SinkError> {
        let body = serde_json::to_vec(&ObjectEnvelope::new(&self.class_name, txn))?;

        let response = self
            .client
            .post(&self.objects_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SinkError::Network(e.to_string()))?;

        let status = response.status();
        // Response body is not used, only drained so the connection can be reused
        let _ = response.bytes().await;

        if !status.is_success() {
            return Err(SinkError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl TxnSink for ObjectStoreSink {
    async fn save(&self, txn: FinancialTxn) {
        match self.try_save(&txn).await {
            Ok(()) => {
                self.stats.record_persisted();
                tracing::debug!(
                    trace_id = %txn.trace_id,
                    span_id = %txn.span_id,
                    status = txn.status.as_str(),
                    "Transaction record stored"
                );
            }
            Err(e) => {
                self.stats.record_dropped();
                tracing::warn!(
                    url = %self.objects_url,
                    status = txn.status.as_str(),
                    "Object store write failed: {}",
                    e
                );
                dead_letter(&txn, &e.to_string());
            }
        }
    }
}
