//! Delivery of transaction records to the object store
//!
//! Delivery is best-effort: a [`TxnSink`] never reports failure to its
//! caller. Dropped records are counted in [`BridgeStats`](crate::stats::BridgeStats)
//! and written to the dead-letter log target.

pub mod config;
pub mod object_store;
pub mod queue;

use async_trait::async_trait;

use crate::txn::FinancialTxn;

pub use config::SinkConfig;
pub use object_store::ObjectStoreSink;
pub use queue::QueuedSink;

/// Log target that receives every dropped record as JSON
pub const DEAD_LETTER_TARGET: &str = "txnbridge::dead_letter";

/// Fire-and-forget destination for transaction records
#[async_trait]
pub trait TxnSink: Send + Sync {
    /// Persist one record. Failures are handled inside the sink.
    async fn save(&self, txn: FinancialTxn);
}

/// Sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Object store returned status {0}")]
    Status(u16),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Write a dropped record to the dead-letter log
pub(crate) fn dead_letter(txn: &FinancialTxn, reason: &str) {
    match serde_json::to_string(txn) {
        Ok(record) => tracing::warn!(
            target: DEAD_LETTER_TARGET,
            reason,
            record = %record,
            "Dropped transaction record"
        ),
        Err(e) => tracing::warn!(
            target: DEAD_LETTER_TARGET,
            reason,
            trace_id = %txn.trace_id,
            span_id = %txn.span_id,
            status = txn.status.as_str(),
            "Dropped transaction record (unserializable: {})",
            e
        ),
    }
}
