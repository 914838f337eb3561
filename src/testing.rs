//! Builders and fakes shared by unit tests

use std::io::Write;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::{status::StatusCode, ResourceSpans, ScopeSpans, Span, Status};
use parking_lot::Mutex;
use prost::Message;

use crate::sink::TxnSink;
use crate::txn::FinancialTxn;

pub fn ms(millis: u64) -> u64 {
    millis * 1_000_000
}

pub fn string_kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::StringValue(value.to_string())),
        }),
        ..Default::default()
    }
}

pub fn int_kv(key: &str, value: i64) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::IntValue(value)),
        }),
        ..Default::default()
    }
}

pub fn span(name: &str, start_ns: u64, end_ns: u64, attributes: Vec<KeyValue>) -> Span {
    Span {
        trace_id: vec![
            0x5b, 0x8a, 0xa5, 0xa2, 0xd2, 0xc8, 0x72, 0xe8, 0x32, 0x1c, 0xf3, 0x73, 0x08, 0xd6, 0x9d,
            0xf2,
        ],
        span_id: vec![0x05, 0x15, 0x81, 0xbf, 0x3c, 0xb5, 0x5c, 0x13],
        name: name.to_string(),
        start_time_unix_nano: start_ns,
        end_time_unix_nano: end_ns,
        attributes,
        ..Default::default()
    }
}

pub fn with_status(mut span: Span, code: StatusCode) -> Span {
    span.status = Some(Status {
        code: code as i32,
        ..Default::default()
    });
    span
}

pub fn resource_spans(resource_attrs: Option<Vec<KeyValue>>, scopes: Vec<Vec<Span>>) -> ResourceSpans {
    ResourceSpans {
        resource: resource_attrs.map(|attributes| Resource {
            attributes,
            ..Default::default()
        }),
        scope_spans: scopes
            .into_iter()
            .map(|spans| ScopeSpans {
                scope: Some(InstrumentationScope {
                    name: "victoria-demo".to_string(),
                    ..Default::default()
                }),
                spans,
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

/// The single-span "payments" request used across tests
pub fn payments_request() -> ExportTraceServiceRequest {
    let sp = with_status(
        span(
            "charge",
            ms(1000),
            ms(1200),
            vec![string_kv("txn.amount", "9.99"), string_kv("txn.currency", "EUR")],
        ),
        StatusCode::Ok,
    );
    ExportTraceServiceRequest {
        resource_spans: vec![resource_spans(
            Some(vec![string_kv("service.name", "payments")]),
            vec![vec![sp]],
        )],
    }
}

/// R resources × S scopes × N spans
pub fn grid_request(resources: usize, scopes: usize, spans: usize) -> ExportTraceServiceRequest {
    let resource_spans = (0..resources)
        .map(|r| {
            let scopes = (0..scopes)
                .map(|s| {
                    (0..spans)
                        .map(|n| span(&format!("op-{}-{}-{}", r, s, n), ms(0), ms(1), vec![]))
                        .collect()
                })
                .collect();
            resource_spans(
                Some(vec![string_kv("service.name", &format!("svc-{}", r))]),
                scopes,
            )
        })
        .collect();
    ExportTraceServiceRequest { resource_spans }
}

pub fn encode(request: &ExportTraceServiceRequest) -> Vec<u8> {
    request.encode_to_vec()
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// Sink that keeps every record it receives
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<FinancialTxn>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FinancialTxn> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }
}

#[async_trait]
impl TxnSink for RecordingSink {
    async fn save(&self, txn: FinancialTxn) {
        self.records.lock().push(txn);
    }
}
