//! JSON input fixtures.
//!
//! ```json
//! [
//!   [ { "messages": [1, 2.5, "text"] } ],
//!   [ { "type": "START", "messages": [{ "type": "LOG", "value": "hi" }] } ]
//! ]
//! ```
//!
//! One entry per source id. A message is either a raw value (`DATA`) or a
//! `{ "type", "value" }` pair.

use serde::Deserialize;
use smc_api::{Action, ActionType, Message, MessageType, ModuleError, Value};
use std::time::SystemTime;

#[derive(Deserialize)]
struct ActionFixture {
    #[serde(rename = "type", default)]
    action_type: ActionType,
    #[serde(default)]
    messages: Vec<MessageFixture>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessageFixture {
    Typed {
        #[serde(rename = "type")]
        message_type: MessageType,
        value: serde_json::Value,
    },
    Raw(serde_json::Value),
}

impl ActionFixture {
    fn into_action(self) -> Result<Action, ModuleError> {
        let date = SystemTime::now();
        let messages = self
            .messages
            .into_iter()
            .map(|message| {
                let (value, kind) = match message {
                    MessageFixture::Typed {
                        message_type,
                        value,
                    } => (value, message_type),
                    MessageFixture::Raw(value) => (value, MessageType::Data),
                };
                Ok(Message::at(Value::from_json(&value)?, kind, date))
            })
            .collect::<Result<Vec<_>, ModuleError>>()?;
        Ok(Action::new(messages, self.action_type))
    }
}

/// Parse pre-partitioned input: one list of actions per source id.
pub fn input_from_json(json: &str) -> Result<Vec<Vec<Action>>, ModuleError> {
    let sources: Vec<Vec<ActionFixture>> = serde_json::from_str(json)?;
    sources
        .into_iter()
        .map(|actions| {
            actions
                .into_iter()
                .map(ActionFixture::into_action)
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_and_typed_messages() {
        let input = input_from_json(
            r#"[
                [{ "messages": [1, 2.5, "x"] }],
                [{ "type": "START", "messages": [{ "type": "LOG", "value": "hi" }] }],
                []
            ]"#,
        )
        .unwrap();
        assert_eq!(input.len(), 3);

        let first = &input[0][0];
        assert_eq!(first.action_type(), ActionType::Execute);
        let values: Vec<_> = first.messages().iter().map(|m| m.value().clone()).collect();
        assert_eq!(values, [Value::Long(1), Value::Double(2.5), Value::from("x")]);
        assert!(first.messages().iter().all(|m| m.date() == first.messages()[0].date()));

        let second = &input[1][0];
        assert_eq!(second.action_type(), ActionType::Start);
        assert_eq!(second.messages()[0].message_type(), MessageType::Log);
        assert!(input[2].is_empty());
    }

    #[test]
    fn null_values_are_rejected() {
        let err = input_from_json(r#"[[{ "messages": [null] }]]"#).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
