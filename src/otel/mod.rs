//! OpenTelemetry ingest for the bridge
//!
//! Accepts OTLP/HTTP protobuf trace exports and turns every span into a
//! financial transaction record.
//!
//! ## Ingest
//!
//! Point an OTLP exporter (or an OTel Collector) at the bridge:
//! ```bash
//! OTEL_EXPORTER_OTLP_TRACES_ENDPOINT=http://localhost:9000/v1/traces
//! OTEL_EXPORTER_OTLP_PROTOCOL=http/protobuf
//! OTEL_EXPORTER_OTLP_COMPRESSION=gzip
//! ```
//!
//! Or forward from a Collector:
//! ```yaml
//! exporters:
//!   otlphttp:
//!     endpoint: http://txnbridge:9000
//!     compression: gzip
//! ```
//!
//! Spans carry business data in the `txn.amount` and `txn.currency`
//! attributes; the owning service comes from the resource's `service.name`.

mod ingest;

pub use ingest::{
    decode_export_request, handle_otlp_traces, ingest_export_request, resolve_service_name,
    IngestError, SERVICE_NAME_ATTR, UNKNOWN_SERVICE,
};
