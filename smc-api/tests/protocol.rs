//! Acceptance tests for the protocol crate.
//!
//! Tests cover:
//! - Object safety of the unit trait
//! - Wire forms of envelopes
//! - Value kind inference across native and JSON inputs
//! - Filter construction from raw host parameters

use serde_json::json;
use smc_api::*;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Object Safety
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn _assert_send<T: Send>() {}

#[test]
fn managed_unit_is_object_safe_send() {
    _assert_send::<Box<dyn ManagedUnit>>();
}

#[test]
fn error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ModuleError>();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire forms
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn action_serializes_with_type_tags() {
    let action = Action::data(["hi"]);
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["type"], json!("EXECUTE"));
    assert_eq!(json["messages"][0]["type"], json!("DATA"));
    assert_eq!(json["messages"][0]["value"], json!({"type": "STRING", "value": "hi"}));

    let back: Action = serde_json::from_value(json).unwrap();
    assert_eq!(back, action);
}

#[test]
fn command_defaults_to_execute_on_the_wire() {
    let command: Command = serde_json::from_value(json!({"actions": []})).unwrap();
    assert_eq!(command.command_type(), CommandType::Execute);
}

#[test]
fn filter_serializes_internally_tagged() {
    let json = serde_json::to_value(SourceFilter::object_paths(["a.b"])).unwrap();
    assert_eq!(json, json!({"type": "OBJECT_PATHS", "paths": ["a.b"]}));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Value inference
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn inference_table() {
    let cases: Vec<(Value, ValueType)> = vec![
        (Value::from(42.0), ValueType::Long),
        (Value::from(42.5), ValueType::Double),
        (Value::from(7_i64), ValueType::Long),
        (Value::from("s"), ValueType::String),
        (Value::from(false), ValueType::Boolean),
        (Value::from(vec![0_u8, 1]), ValueType::Bytes),
        (Value::from(ObjectArray::default()), ValueType::ObjectArray),
        (Value::from(ObjectElement::default()), ValueType::ObjectElement),
    ];
    for (value, expected) in cases {
        assert_eq!(value.value_type(), expected, "{value:?}");
    }
}

#[test]
fn message_kind_follows_value() {
    let m = Message::new(ObjectElement::default().with_field("k", 1.5), MessageType::Log);
    assert_eq!(m.value_type(), ValueType::ObjectElement);
    assert_eq!(m.message_type(), MessageType::Log);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Filters from raw parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn raw_string_contain_filter() {
    let filter = SourceFilter::from_params(
        SourceFilterType::StringContain,
        vec![Value::from(true), Value::from("err"), Value::from("")],
    )
    .unwrap();
    assert_eq!(filter, SourceFilter::string_contain(true, "err", None));

    let kept = filter.apply(vec![
        Message::data("error: disk"),
        Message::data("ok"),
        Message::data(3),
    ]);
    assert_eq!(kept.len(), 1);
}

#[test]
fn raw_position_filter_rejects_odd_ranges() {
    let ranges: ObjectArray = vec![Value::Long(0)].into_iter().collect();
    let err = SourceFilter::from_params(
        SourceFilterType::Position,
        vec![
            Value::from(ranges),
            Value::Long(2),
            Value::Long(0),
            Value::Long(0),
            Value::Boolean(false),
        ],
    )
    .unwrap_err();
    assert!(err.is_invalid_argument());
}
