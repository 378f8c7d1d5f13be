use fenrir_types::{AggrFn, Error, Fqn, PrimitiveType, Value};

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parses_bare_name() {
    let fqn = Fqn::parse("hello_world").unwrap();
    assert_eq!(fqn.name(), "hello_world");
    assert_eq!(fqn.namespace(), None);
    assert_eq!(fqn.aggr(), None);
    assert_eq!(fqn.feature_fqn(), "hello_world");
}

#[test]
fn parses_namespace_and_aggregation() {
    let fqn = Fqn::parse("web.clicks[distinct_count]").unwrap();
    assert_eq!(fqn.namespace(), Some("web"));
    assert_eq!(fqn.name(), "clicks");
    assert_eq!(fqn.aggr(), Some(AggrFn::DistinctCount));
    assert_eq!(fqn.feature_fqn(), "web.clicks");
    assert_eq!(fqn.to_string(), "web.clicks[distinct_count]");
}

#[test]
fn rejects_illegal_names() {
    for bad in ["", "Hello", "-lead", "trail_", "a b", "ns.", ".name", "a.b.c"] {
        assert!(Fqn::parse(bad).is_err(), "`{bad}` should be rejected");
    }
}

#[test]
fn rejects_unknown_aggregation() {
    assert!(Fqn::parse("clicks[median]").is_err());
    assert!(Fqn::parse("clicks]").is_err());
}

#[test]
fn with_aggr_appends_suffix() {
    let fqn = Fqn::new(Some("web"), "clicks").unwrap().with_aggr(AggrFn::Sum);
    assert_eq!(fqn.to_string(), "web.clicks[sum]");
}

// ── Aggregations ─────────────────────────────────────────────────

#[test]
fn arithmetic_aggregations_require_numeric() {
    for aggr in [AggrFn::Sum, AggrFn::Avg, AggrFn::Max, AggrFn::Min] {
        assert!(aggr.supports(PrimitiveType::Integer));
        assert!(aggr.supports(PrimitiveType::Float));
        assert!(!aggr.supports(PrimitiveType::String));
    }
}

#[test]
fn counting_aggregations_accept_any_known_type() {
    assert!(AggrFn::Count.supports(PrimitiveType::String));
    assert!(AggrFn::DistinctCount.supports(PrimitiveType::Boolean));
    assert!(!AggrFn::Count.supports(PrimitiveType::Unknown));
}

#[test]
fn aggr_names_round_trip() {
    for aggr in AggrFn::ALL {
        assert_eq!(aggr.as_str().parse::<AggrFn>().unwrap(), aggr);
    }
}

// ── Evaluation ───────────────────────────────────────────────────

#[test]
fn scalar_is_a_window_of_one() {
    let v = Value::Integer(4);
    assert_eq!(AggrFn::Sum.apply(&v).unwrap(), Some(Value::Integer(4)));
    assert_eq!(AggrFn::Avg.apply(&v).unwrap(), Some(Value::Float(4.0)));
    assert_eq!(AggrFn::Count.apply(&v).unwrap(), Some(Value::Integer(1)));
}

#[test]
fn numeric_list_aggregates() {
    let v = Value::FloatList(vec![1.5, -2.0, 4.0]);
    assert_eq!(AggrFn::Sum.apply(&v).unwrap(), Some(Value::Float(3.5)));
    assert_eq!(AggrFn::Max.apply(&v).unwrap(), Some(Value::Float(4.0)));
    assert_eq!(AggrFn::Min.apply(&v).unwrap(), Some(Value::Float(-2.0)));

    let ints = Value::IntegerList(vec![3, 1, 2]);
    assert_eq!(AggrFn::Max.apply(&ints).unwrap(), Some(Value::Integer(3)));
    assert_eq!(AggrFn::Avg.apply(&ints).unwrap(), Some(Value::Float(2.0)));
}

#[test]
fn empty_list_has_sum_and_count_only() {
    let v = Value::IntegerList(vec![]);
    assert_eq!(AggrFn::Sum.apply(&v).unwrap(), Some(Value::Integer(0)));
    assert_eq!(AggrFn::Count.apply(&v).unwrap(), Some(Value::Integer(0)));
    assert_eq!(AggrFn::Avg.apply(&v).unwrap(), None);
    assert_eq!(AggrFn::Max.apply(&v).unwrap(), None);
}

#[test]
fn distinct_count_ignores_repeats() {
    let v = Value::StringList(vec!["a".into(), "b".into(), "a".into()]);
    assert_eq!(AggrFn::DistinctCount.apply(&v).unwrap(), Some(Value::Integer(2)));
    assert_eq!(AggrFn::ApproxDistinctCount.apply(&v).unwrap(), Some(Value::Integer(2)));
}

#[test]
fn arithmetic_on_strings_is_rejected() {
    let v = Value::StringList(vec!["a".into()]);
    assert!(matches!(AggrFn::Sum.apply(&v), Err(Error::InvalidArgument(_))));
}

#[test]
fn output_types() {
    assert_eq!(AggrFn::Sum.output_type(PrimitiveType::IntegerList), PrimitiveType::Integer);
    assert_eq!(AggrFn::Avg.output_type(PrimitiveType::Integer), PrimitiveType::Float);
    assert_eq!(AggrFn::DistinctCount.output_type(PrimitiveType::String), PrimitiveType::Integer);
}
