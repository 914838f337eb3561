//! Financial transaction record derived from a span

use serde::{Deserialize, Serialize};

/// Outcome of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnStatus {
    Ok,
    Error,
}

impl TxnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnStatus::Ok => "OK",
            TxnStatus::Error => "ERROR",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TxnStatus::Error)
    }
}

/// One transaction, projected from exactly one span.
///
/// Field names are the property names written to the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTxn {
    /// Service name from resource attributes
    pub service: String,
    /// Span name
    pub txn_name: String,
    /// Start time in milliseconds since epoch
    pub start_time: i64,
    /// End time in milliseconds since epoch
    pub end_time: i64,
    /// `end_time - start_time`, never clamped
    pub latency_ms: i64,
    pub status: TxnStatus,
    /// 32 hex character trace ID
    pub trace_id: String,
    /// 16 hex character span ID
    pub span_id: String,
    pub amount: f64,
    pub currency: String,
    pub error: bool,
}

/// Object-creation payload: `{"class": ..., "properties": {...}}`
#[derive(Debug, Serialize)]
pub struct ObjectEnvelope<'a> {
    pub class: &'a str,
    pub properties: &'a FinancialTxn,
}

impl<'a> ObjectEnvelope<'a> {
    pub fn new(class: &'a str, properties: &'a FinancialTxn) -> Self {
        Self { class, properties }
    }
}
