//! Test units prove the dispatch protocol is usable.
//! Run with: cargo test --features test-utils --test units

#![cfg(feature = "test-utils")]

use smc_api::test_utils::{CountingUnit, EchoUnit, FailingUnit};
use smc_api::*;

#[tokio::test]
async fn echo_unit_returns_values_as_data() {
    let mut unit = EchoUnit;
    let action = unit
        .execute(CommandType::Execute, Some(vec![Value::from(1), Value::from("two")]))
        .await
        .unwrap();
    assert_eq!(action.action_type(), ActionType::Execute);
    let values: Vec<_> = action.messages().iter().map(Message::value).cloned().collect();
    assert_eq!(values, [Value::Long(1), Value::from("two")]);
}

#[tokio::test]
async fn echo_unit_without_values_is_an_error_action() {
    let action = EchoUnit.execute(CommandType::Start, None).await.unwrap();
    assert!(action.is_error());
}

#[tokio::test]
async fn counting_unit_counts() {
    let mut unit = CountingUnit::new();
    unit.execute(CommandType::Start, None).await.unwrap();
    let second = unit.execute(CommandType::Execute, None).await.unwrap();
    assert_eq!(second.messages()[0].value(), &Value::Long(2));
    assert_eq!(second.messages()[1].value(), &Value::from("Execute"));
}

#[tokio::test]
async fn failing_unit_reports_failure() {
    let err = FailingUnit::new("disk full")
        .execute(CommandType::Execute, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::Failure(ref r) if r == "disk full"));
}
