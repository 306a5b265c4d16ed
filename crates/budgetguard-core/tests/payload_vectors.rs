//! Envelope -> alert record vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use budgetguard_core::alert::{decode_alert, AlertRecord, EventEnvelope};
use budgetguard_core::Result;

use vector_loader::{envelope_with, TestVector};

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

fn run(body: &[u8]) -> Result<Option<AlertRecord>> {
    let env = EventEnvelope::from_slice(body)?;
    decode_alert(&env)
}

#[test]
fn payload_vectors() {
    let files = [
        "alert_basic.json",
        "alert_string_amounts.json",
        "alert_missing_budget.json",
        "alert_empty_object.json",
        "envelope_no_message.json",
        "envelope_empty_data.json",
        "envelope_invalid.json",
        "bad_base64.json",
        "bad_utf8.json",
        "bad_json.json",
        "not_object.json",
        "not_object_string.json",
        "payload_null.json",
        "payload_empty_array.json",
        "bad_amount.json",
    ];

    for f in files {
        let v = load(f);
        let res = run(&v.envelope.body());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let decoded = res.unwrap_or_else(|e| panic!("vector={} failed: {e}", v.description));
        if v.expect_empty {
            assert!(decoded.is_none(), "vector={}", v.description);
            continue;
        }

        let alert = decoded.unwrap_or_else(|| panic!("vector={} decoded empty", v.description));
        let expect = v.expect.expect("vector needs expect");
        assert_eq!(alert.cost_amount, expect["costAmount"].as_f64().unwrap(), "vector={}", v.description);
        assert_eq!(alert.budget_amount, expect["budgetAmount"].as_f64().unwrap(), "vector={}", v.description);
        assert_eq!(alert.display_name(), expect["budgetDisplayName"].as_str().unwrap(), "vector={}", v.description);
    }
}

#[test]
fn informational_fields_are_kept() {
    let env = envelope_with(
        r#"{"costAmount": 90, "budgetAmount": 100, "currencyCode": "EUR",
            "alertThresholdExceeded": "0.9", "costIntervalStart": "2026-10-01T07:00:00Z"}"#,
    );
    let alert = decode_alert(&env).unwrap().unwrap();
    assert_eq!(alert.currency_code.as_deref(), Some("EUR"));
    assert_eq!(alert.alert_threshold_exceeded, Some(0.9));
    assert_eq!(alert.forecast_threshold_exceeded, None);
    assert_eq!(alert.cost_interval_start.as_deref(), Some("2026-10-01T07:00:00Z"));
}

#[test]
fn non_finite_amount_is_malformed() {
    let env = envelope_with(r#"{"costAmount": "NaN", "budgetAmount": 100}"#);
    let err = decode_alert(&env).expect_err("NaN must be rejected");
    assert_eq!(err.code().as_str(), "MALFORMED_PAYLOAD");
}

#[test]
fn null_message_is_empty() {
    let env = EventEnvelope::from_slice(br#"{"message": null}"#).unwrap();
    assert!(decode_alert(&env).unwrap().is_none());
}

#[test]
fn blank_payloads_are_empty() {
    for data in ["null", "[]", "\"\"", "false", "0", "0.0", "{}"] {
        let decoded = decode_alert(&envelope_with(data)).unwrap_or_else(|e| panic!("data={data}: {e}"));
        assert!(decoded.is_none(), "data={data}");
    }
}

#[test]
fn non_blank_scalars_are_malformed() {
    for data in ["true", "7", "[{}]", "\"x\""] {
        let err = decode_alert(&envelope_with(data)).expect_err("must fail");
        assert_eq!(err.code().as_str(), "MALFORMED_PAYLOAD", "data={data}");
    }
}
