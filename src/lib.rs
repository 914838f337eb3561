//! txnbridge: OTLP traces in, financial transactions out
//!
//! Receives OpenTelemetry trace exports over HTTP and re-projects every span
//! into a `FinancialTxn` record written to an external object store.
//!
//! # Pipeline
//!
//! - **Ingest**: `POST /v1/traces`, protobuf body, optionally gzip-compressed
//! - **Transform**: one span → one record (`txn.amount`, `txn.currency`,
//!   status, timing and IDs)
//! - **Sink**: best-effort `POST /v1/objects` to the object store, inline or
//!   through a bounded worker queue
//!
//! Undecodable requests and undeliverable records never fail the sender;
//! they are counted (`GET /stats`) and logged to the dead-letter target.
//!
//! # Example
//!
//! ```no_run
//! use txnbridge::otel::decode_export_request;
//! use txnbridge::txn::span_to_txn;
//! use txnbridge::otel::resolve_service_name;
//!
//! # fn body() -> Vec<u8> { Vec::new() }
//! let request = decode_export_request(&body(), Some("gzip"), 64 * 1024 * 1024).unwrap();
//! for rs in &request.resource_spans {
//!     let service = resolve_service_name(rs);
//!     for ss in &rs.scope_spans {
//!         for span in &ss.spans {
//!             let txn = span_to_txn(span, service);
//!             println!("{} {} {}", txn.service, txn.amount, txn.currency);
//!         }
//!     }
//! }
//! ```

pub mod api;
pub mod otel;
pub mod sink;
pub mod stats;
pub mod txn;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use sink::{ObjectStoreSink, QueuedSink, SinkConfig, SinkError, TxnSink};
pub use stats::{BridgeStats, StatsSnapshot};
pub use txn::{span_to_txn, FinancialTxn, TxnStatus};
