//! OTLP ingest handler

use std::io::Read;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_ENCODING, HeaderMap, StatusCode},
};
use flate2::read::GzDecoder;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::any_value;
use opentelemetry_proto::tonic::trace::v1::ResourceSpans;
use prost::Message;

use crate::api::handlers::AppState;
use crate::sink::TxnSink;
use crate::stats::BridgeStats;
use crate::txn::span_to_txn;

/// Resource attribute naming the emitting service
pub const SERVICE_NAME_ATTR: &str = "service.name";
/// Service name used when the resource does not carry one
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Errors that cause a whole export request to be dropped
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("gzip: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("invalid protobuf: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("decoded body exceeds {0} bytes")]
    TooLarge(usize),
}

fn is_gzip(content_encoding: Option<&str>) -> bool {
    content_encoding
        .map(|enc| enc.trim().eq_ignore_ascii_case("gzip"))
        .unwrap_or(false)
}

/// Decompress (when gzip-encoded) and decode an OTLP trace export body.
///
/// The message bytes, after decompression, may not exceed `max_decoded_bytes`.
pub fn decode_export_request(
    body: &[u8],
    content_encoding: Option<&str>,
    max_decoded_bytes: usize,
) -> Result<ExportTraceServiceRequest, IngestError> {
    if is_gzip(content_encoding) {
        let mut raw = Vec::new();
        GzDecoder::new(body)
            .take(max_decoded_bytes as u64 + 1)
            .read_to_end(&mut raw)?;
        if raw.len() > max_decoded_bytes {
            return Err(IngestError::TooLarge(max_decoded_bytes));
        }
        return Ok(ExportTraceServiceRequest::decode(raw.as_slice())?);
    }
    if body.len() > max_decoded_bytes {
        return Err(IngestError::TooLarge(max_decoded_bytes));
    }
    Ok(ExportTraceServiceRequest::decode(body)?)
}

/// Service name of a resource.
///
/// The first `service.name` attribute decides: its string value, or `""` when
/// that value is not a string. `"unknown"` only when there is no such attribute.
pub fn resolve_service_name(resource_spans: &ResourceSpans) -> &str {
    let Some(kv) = resource_spans
        .resource
        .as_ref()
        .and_then(|r| r.attributes.iter().find(|kv| kv.key == SERVICE_NAME_ATTR))
    else {
        return UNKNOWN_SERVICE;
    };

    match kv.value.as_ref().and_then(|v| v.value.as_ref()) {
        Some(any_value::Value::StringValue(s)) => s.as_str(),
        _ => "",
    }
}

/// Transform every span of a decoded request and hand each record to `sink`.
///
/// Spans are visited resource → scope → span in document order, and each
/// sink call completes before the next span is transformed. Returns the
/// number of records produced.
pub async fn ingest_export_request(
    request: &ExportTraceServiceRequest,
    sink: &dyn TxnSink,
    stats: &BridgeStats,
) -> usize {
    let mut count = 0;

    for resource_spans in &request.resource_spans {
        let service = resolve_service_name(resource_spans);

        for scope_spans in &resource_spans.scope_spans {
            for span in &scope_spans.spans {
                sink.save(span_to_txn(span, service)).await;
                count += 1;
            }
        }
    }

    stats.record_processed(count as u64);
    tracing::info!("financial txns: {}", count);
    count
}

/// Handle OTLP/HTTP trace export (protobuf format)
///
/// Endpoint: POST /v1/traces
///
/// Always answers 200. Undecodable bodies are logged, counted and dropped.
pub async fn handle_otlp_traces(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    state.stats.record_request();

    let content_encoding = headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok());

    let request = match decode_export_request(&body, content_encoding, state.max_decoded_bytes) {
        Ok(request) => request,
        Err(e) => {
            state.stats.record_rejected();
            tracing::warn!(
                body_bytes = body.len(),
                content_encoding = content_encoding.unwrap_or(""),
                "Dropping OTLP request: {}",
                e
            );
            return StatusCode::OK;
        }
    };

    tracing::debug!(
        "OTLP: received {} resource spans",
        request.resource_spans.len()
    );

    ingest_export_request(&request, state.sink.as_ref(), &state.stats).await;
    StatusCode::OK
}
