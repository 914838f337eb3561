//! Span → transaction mapping

use opentelemetry_proto::tonic::common::v1::{any_value, KeyValue};
use opentelemetry_proto::tonic::trace::v1::{status::StatusCode, Span};

use super::record::{FinancialTxn, TxnStatus};

/// Span attribute carrying the transaction amount as a decimal string
pub const AMOUNT_ATTR: &str = "txn.amount";
/// Span attribute carrying the ISO currency code
pub const CURRENCY_ATTR: &str = "txn.currency";
/// Currency used when the span does not carry one
pub const DEFAULT_CURRENCY: &str = "NA";

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Render trace/span ID bytes as lowercase hex
pub fn hex_id(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// String value of the first attribute named `key`.
///
/// Returns an empty string when the key is missing or its value is not a string.
pub fn string_attr<'a>(attributes: &'a [KeyValue], key: &str) -> &'a str {
    attributes
        .iter()
        .find(|kv| kv.key == key)
        .and_then(|kv| kv.value.as_ref())
        .and_then(|v| match &v.value {
            Some(any_value::Value::StringValue(s)) => Some(s.as_str()),
            _ => None,
        })
        .unwrap_or("")
}

/// Parse an amount string, falling back to 0 for anything that is not a finite number.
///
/// Accepts decimal floats and hex floats with a binary exponent (`0x1.8p3`).
pub fn parse_amount(raw: &str) -> f64 {
    raw.parse::<f64>()
        .ok()
        .or_else(|| parse_hex_float(raw))
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

/// `[+-]0x<hex mantissa>[.<hex fraction>]p[+-]<decimal exponent>`; the exponent is required
fn parse_hex_float(raw: &str) -> Option<f64> {
    let (negative, rest) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };
    let rest = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))?;
    let (mantissa, exponent) = rest.split_once(|c: char| c == 'p' || c == 'P')?;
    let exponent: i32 = exponent.parse().ok()?;

    let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut value = 0.0f64;
    for c in int_digits.chars().chain(frac_digits.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let scale = exponent.checked_sub(4 * i32::try_from(frac_digits.len()).ok()?)?;
    let value = value * 2f64.powi(scale);

    Some(if negative { -value } else { value })
}

fn nanos_to_millis(nanos: u64) -> i64 {
    (nanos / NANOS_PER_MILLI) as i64
}

/// Map one span, owned by `service`, to a transaction record
pub fn span_to_txn(span: &Span, service: &str) -> FinancialTxn {
    let start_time = nanos_to_millis(span.start_time_unix_nano);
    let end_time = nanos_to_millis(span.end_time_unix_nano);

    let status = match &span.status {
        Some(s) if s.code == StatusCode::Error as i32 => TxnStatus::Error,
        _ => TxnStatus::Ok,
    };

    let currency = match string_attr(&span.attributes, CURRENCY_ATTR) {
        "" => DEFAULT_CURRENCY,
        c => c,
    };

    FinancialTxn {
        service: service.to_string(),
        txn_name: span.name.clone(),
        start_time,
        end_time,
        latency_ms: end_time - start_time,
        status,
        trace_id: hex_id(&span.trace_id),
        span_id: hex_id(&span.span_id),
        amount: parse_amount(string_attr(&span.attributes, AMOUNT_ATTR)),
        currency: currency.to_string(),
        error: status.is_error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{int_kv, ms, span, string_kv, with_status};

    #[test]
    fn test_payments_scenario() {
        let sp = span(
            "charge",
            ms(1000),
            ms(1200),
            vec![string_kv("txn.amount", "9.99"), string_kv("txn.currency", "EUR")],
        );
        let sp = with_status(sp, StatusCode::Ok);

        let txn = span_to_txn(&sp, "payments");
        assert_eq!(txn.service, "payments");
        assert_eq!(txn.txn_name, "charge");
        assert_eq!(txn.start_time, 1000);
        assert_eq!(txn.end_time, 1200);
        assert_eq!(txn.latency_ms, 200);
        assert_eq!(txn.status, TxnStatus::Ok);
        assert_eq!(txn.amount, 9.99);
        assert_eq!(txn.currency, "EUR");
        assert!(!txn.error);
    }

    #[test]
    fn test_error_span_mapping() {
        let sp = span(
            "refund",
            ms(10),
            ms(20),
            vec![string_kv("txn.amount", "42.50"), string_kv("txn.currency", "USD")],
        );
        let sp = with_status(sp, StatusCode::Error);

        let txn = span_to_txn(&sp, "svc");
        assert_eq!(txn.amount, 42.50);
        assert_eq!(txn.currency, "USD");
        assert_eq!(txn.status, TxnStatus::Error);
        assert!(txn.error);
    }

    #[test]
    fn test_missing_attributes_use_defaults() {
        let sp = span("checkout-flow", ms(0), ms(5), vec![]);

        let txn = span_to_txn(&sp, "svc");
        assert_eq!(txn.currency, "NA");
        assert_eq!(txn.amount, 0.0);
    }

    #[test]
    fn test_empty_currency_defaults() {
        let sp = span("x", 0, 0, vec![string_kv("txn.currency", "")]);
        assert_eq!(span_to_txn(&sp, "svc").currency, "NA");
    }

    #[test]
    fn test_unparseable_amount_is_zero() {
        for raw in ["abc", "", "12,50", "NaN", "inf", "-infinity"] {
            let sp = span("x", 0, 0, vec![string_kv("txn.amount", raw)]);
            assert_eq!(span_to_txn(&sp, "svc").amount, 0.0, "amount {:?}", raw);
        }
    }

    #[test]
    fn test_hex_float_amount() {
        assert_eq!(parse_amount("0x1p4"), 16.0);
        assert_eq!(parse_amount("0X1.8P+1"), 3.0);
        assert_eq!(parse_amount("-0x.8p1"), -1.0);
        assert_eq!(parse_amount("0xAp-2"), 2.5);

        let sp = span("x", 0, 0, vec![string_kv("txn.amount", "0x1p4")]);
        assert_eq!(span_to_txn(&sp, "svc").amount, 16.0);
    }

    #[test]
    fn test_malformed_hex_float_is_zero() {
        // binary exponent is mandatory, digits must be hex
        for raw in ["0x10", "0xp4", "0x1gp4", "0x1p", "0x1p4.5", "0x1p99999"] {
            assert_eq!(parse_amount(raw), 0.0, "amount {:?}", raw);
        }
    }

    #[test]
    fn test_non_string_amount_is_zero() {
        let sp = span("x", 0, 0, vec![int_kv("txn.amount", 100)]);
        assert_eq!(span_to_txn(&sp, "svc").amount, 0.0);
    }

    #[test]
    fn test_first_duplicate_attribute_wins() {
        let sp = span(
            "x",
            0,
            0,
            vec![string_kv("txn.currency", "GBP"), string_kv("txn.currency", "JPY")],
        );
        assert_eq!(span_to_txn(&sp, "svc").currency, "GBP");
    }

    #[test]
    fn test_unset_and_missing_status_are_ok() {
        let sp = span("x", 0, 0, vec![]);
        assert_eq!(span_to_txn(&sp, "svc").status, TxnStatus::Ok);

        let sp = with_status(span("x", 0, 0, vec![]), StatusCode::Unset);
        let txn = span_to_txn(&sp, "svc");
        assert_eq!(txn.status, TxnStatus::Ok);
        assert!(!txn.error);
    }

    #[test]
    fn test_hex_rendering() {
        let trace = [0xABu8, 0x01, 0xFF, 0x00, 0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80, 0x90, 0xA0, 0xB0, 0xC0];
        let first = hex_id(&trace);
        assert_eq!(first, hex_id(&trace));
        assert_eq!(first.len(), 32);
        assert_eq!(first, "ab01ff00102030405060708090a0b0c0");
        assert_eq!(first, first.to_lowercase());

        assert_eq!(hex_id(&[0u8; 8]).len(), 16);
        assert_eq!(hex_id(&[]), "");
    }

    #[test]
    fn test_ids_copied_from_span() {
        let sp = span("x", 0, 0, vec![]);
        let txn = span_to_txn(&sp, "svc");
        assert_eq!(txn.trace_id, hex_id(&sp.trace_id));
        assert_eq!(txn.span_id, hex_id(&sp.span_id));
        assert_eq!(txn.trace_id.len(), 32);
        assert_eq!(txn.span_id.len(), 16);
    }

    #[test]
    fn test_negative_latency_passes_through() {
        let sp = span("x", ms(2000), ms(1500), vec![]);
        let txn = span_to_txn(&sp, "svc");
        assert_eq!(txn.latency_ms, -500);
        assert_eq!(txn.latency_ms, txn.end_time - txn.start_time);
    }

    #[test]
    fn test_timestamps_truncate_to_millis() {
        let sp = span("x", 1_999_999, 3_000_001, vec![]);
        let txn = span_to_txn(&sp, "svc");
        assert_eq!(txn.start_time, 1);
        assert_eq!(txn.end_time, 3);
        assert_eq!(txn.latency_ms, 2);
    }
}
