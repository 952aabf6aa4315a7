//! Actions (what a unit produced) and commands (what a module received).

use crate::message::{Message, MessageType};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Kind of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Ordinary processing output.
    #[default]
    Execute,
    /// Produced while starting.
    Start,
    /// Produced while applying a configuration update.
    Update,
    /// Produced while stopping.
    Stop,
}

/// Ordered messages produced by one execution of a unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    messages: Vec<Message>,
    #[serde(rename = "type", default)]
    action_type: ActionType,
}

impl Action {
    /// Create an action of the given kind.
    pub fn new(messages: Vec<Message>, action_type: ActionType) -> Self {
        Self {
            messages,
            action_type,
        }
    }

    /// Create an `EXECUTE` action.
    pub fn execute(messages: Vec<Message>) -> Self {
        Self::new(messages, ActionType::Execute)
    }

    /// `EXECUTE` action of `DATA` messages sharing one timestamp.
    pub fn data<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let date = std::time::SystemTime::now();
        Self::execute(
            values
                .into_iter()
                .map(|v| Message::at(v, MessageType::Data, date))
                .collect(),
        )
    }

    /// Messages in emission order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Kind.
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// Take the messages out.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// An action counts as failed when it carries nothing, or when any of
    /// its messages is an `ERROR` or `ACTION_ERROR`.
    pub fn is_error(&self) -> bool {
        self.messages.is_empty() || self.messages.iter().any(|m| m.message_type().is_error())
    }
}

/// Kind of a [`Command`], and the instruction sent to a managed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    /// Start.
    Start,
    /// Process.
    #[default]
    Execute,
    /// Apply a configuration update.
    Update,
    /// Stop.
    Stop,
}

/// Ordered actions received as one instruction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    actions: Vec<Action>,
    #[serde(rename = "type", default)]
    command_type: CommandType,
}

impl Command {
    /// Create a command of the given kind.
    pub fn new(actions: Vec<Action>, command_type: CommandType) -> Self {
        Self {
            actions,
            command_type,
        }
    }

    /// Create an `EXECUTE` command.
    pub fn execute(actions: Vec<Action>) -> Self {
        Self::new(actions, CommandType::Execute)
    }

    /// Actions in order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Kind.
    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    /// Take the actions out.
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

/// Keep actions of `action_type` and, inside them, messages of
/// `message_type`. `None` matches everything. Order is preserved and
/// actions left without messages are kept.
pub fn filter_actions(
    actions: &[Action],
    action_type: Option<ActionType>,
    message_type: Option<MessageType>,
) -> Vec<Action> {
    actions
        .iter()
        .filter(|a| action_type.is_none_or(|t| a.action_type == t))
        .map(|a| Action {
            messages: a
                .messages
                .iter()
                .filter(|m| message_type.is_none_or(|t| m.message_type() == t))
                .cloned()
                .collect(),
            action_type: a.action_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_execute() {
        assert_eq!(Action::default().action_type(), ActionType::Execute);
        assert_eq!(Command::default().command_type(), CommandType::Execute);
    }

    #[test]
    fn error_detection() {
        assert!(Action::default().is_error());
        assert!(!Action::data([1, 2]).is_error());
        let failed = Action::execute(vec![
            Message::data(1),
            Message::new("boom", MessageType::ActionError),
        ]);
        assert!(failed.is_error());
    }

    #[test]
    fn filtering_keeps_order() {
        let actions = vec![
            Action::execute(vec![
                Message::data(1),
                Message::new("log", MessageType::Log),
                Message::data(2),
            ]),
            Action::new(vec![Message::data(3)], ActionType::Start),
            Action::data([4]),
        ];
        let kept = filter_actions(&actions, Some(ActionType::Execute), Some(MessageType::Data));
        assert_eq!(kept.len(), 2);
        let values: Vec<_> = kept
            .iter()
            .flat_map(|a| a.messages().iter().map(|m| m.value().clone()))
            .collect();
        assert_eq!(values, [Value::Long(1), Value::Long(2), Value::Long(4)]);
    }
}
