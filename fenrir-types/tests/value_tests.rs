//! Value construction, zero values and the scalar string codec.
//!
//! The round-trip law `from_scalar_string(scalar_string(v), t) == v` is
//! checked with proptest for every scalar type.

use chrono::{DateTime, TimeZone, Utc};
use fenrir_types::{Error, PrimitiveType, Value};
use proptest::prelude::*;

fn micros(n: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_micros(n).unwrap()
}

// ── Zero values ──────────────────────────────────────────────────

#[test]
fn zero_values_match_their_type() {
    for t in PrimitiveType::SCALARS.into_iter().chain(PrimitiveType::LISTS) {
        let zero = Value::zero(t).unwrap();
        assert_eq!(zero.primitive_type(), t);
    }
}

#[test]
fn zero_list_is_empty() {
    assert_eq!(Value::zero(PrimitiveType::IntegerList), Some(Value::IntegerList(vec![])));
    assert_eq!(Value::zero(PrimitiveType::Integer), Some(Value::Integer(0)));
    assert_eq!(Value::zero(PrimitiveType::String), Some(Value::String(String::new())));
}

#[test]
fn unknown_has_no_zero() {
    assert!(Value::zero(PrimitiveType::Unknown).is_none());
}

// ── Scalar string codec ──────────────────────────────────────────

#[test]
fn timestamp_encodes_as_micros() {
    let ts = Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap();
    let s = Value::Timestamp(ts).scalar_string().unwrap();
    assert_eq!(s, ts.timestamp_micros().to_string());
}

#[test]
fn float_encodes_without_exponent() {
    assert_eq!(Value::Float(0.5).scalar_string().unwrap(), "0.5");
    assert_eq!(Value::Float(3.0).scalar_string().unwrap(), "3");
}

#[test]
fn scalar_string_rejects_lists() {
    let err = Value::IntegerList(vec![1, 2]).scalar_string().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn from_scalar_string_rejects_list_types() {
    let err = Value::from_scalar_string("1", PrimitiveType::IntegerList).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    let err = Value::from_scalar_string("1", PrimitiveType::Unknown).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn from_scalar_string_reports_parse_errors() {
    let err = Value::from_scalar_string("abc", PrimitiveType::Integer).unwrap_err();
    match err {
        Error::Parse { primitive, input, .. } => {
            assert_eq!(primitive, PrimitiveType::Integer);
            assert_eq!(input, "abc");
        }
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn boolean_accepts_short_forms() {
    assert_eq!(
        Value::from_scalar_string("t", PrimitiveType::Boolean).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        Value::from_scalar_string("0", PrimitiveType::Boolean).unwrap(),
        Value::Boolean(false)
    );
    assert!(Value::from_scalar_string("yes", PrimitiveType::Boolean).is_err());
}

// ── List and numeric helpers ─────────────────────────────────────

#[test]
fn push_appends_matching_item() {
    let mut list = Value::StringList(vec!["a".into()]);
    list.push(Value::from("b")).unwrap();
    assert_eq!(list, Value::StringList(vec!["a".into(), "b".into()]));
    assert_eq!(list.list_len(), Some(2));
}

#[test]
fn push_rejects_mismatched_item() {
    let mut list = Value::StringList(vec![]);
    let err = list.push(Value::Integer(1)).unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch {
            expected: PrimitiveType::String,
            found: PrimitiveType::Integer
        }
    ));
}

#[test]
fn checked_add_numeric() {
    assert_eq!(Value::Integer(2).checked_add(&Value::Integer(3)).unwrap(), Value::Integer(5));
    assert_eq!(Value::Float(1.5).checked_add(&Value::Float(1.0)).unwrap(), Value::Float(2.5));
}

#[test]
fn checked_add_rejects_overflow_and_mismatch() {
    assert!(Value::Integer(i64::MAX).checked_add(&Value::Integer(1)).is_err());
    assert!(matches!(
        Value::Integer(1).checked_add(&Value::Float(1.0)),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        Value::from("a").checked_add(&Value::from("b")),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn serde_is_tagged_by_type() {
    let json = serde_json::to_value(Value::IntegerList(vec![1, 2])).unwrap();
    assert_eq!(json, serde_json::json!({"type": "integer_list", "value": [1, 2]}));
    let back: Value = serde_json::from_value(json).unwrap();
    assert_eq!(back, Value::IntegerList(vec![1, 2]));
}

// ── Round-trip law ───────────────────────────────────────────────

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<String>().prop_map(Value::String),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float),
        any::<bool>().prop_map(Value::Boolean),
        (-62_135_596_800_000_000i64..253_402_300_799_000_000i64)
            .prop_map(|n| Value::Timestamp(micros(n))),
    ]
}

proptest! {
    #[test]
    fn scalar_string_round_trips(v in scalar_value()) {
        let t = v.primitive_type();
        let s = v.scalar_string().unwrap();
        let back = Value::from_scalar_string(&s, t).unwrap();
        prop_assert_eq!(back, v);
    }
}
