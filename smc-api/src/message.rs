//! Messages and the output log they are appended to.

use crate::action::CommandType;
use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// What a [`Message`] means to the host.
///
/// Control kinds carry a string payload naming the touched node:
/// `"<configName>"`, `"<configName> <key>"`, `"<configName>.<execCtxName>"`
/// or `"<configName>.<execCtxName>.<order>"`. Flow-control kinds carry the
/// managed slot id as a `Long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Payload data.
    #[default]
    Data,
    /// Log line.
    Log,
    /// Error reported by the module.
    Error,
    /// A lifecycle phase began.
    ActionStart,
    /// A lifecycle phase ended.
    ActionStop,
    /// A lifecycle phase failed.
    ActionError,
    /// A managed configuration was created.
    ConfigurationControlConfigurationCreate,
    /// A configuration changed name, buffer sizes or enablement.
    ConfigurationControlConfigurationUpdate,
    /// A managed configuration was removed.
    ConfigurationControlConfigurationRemove,
    /// A configuration setting was written.
    ConfigurationControlConfigurationSettingUpdate,
    /// A configuration variable was written.
    ConfigurationControlConfigurationVariableUpdate,
    /// A configuration variable was removed.
    ConfigurationControlConfigurationVariableRemove,
    /// A container was created.
    ConfigurationControlContainerCreate,
    /// A container was removed.
    ConfigurationControlContainerRemove,
    /// An execution context was created.
    ConfigurationControlExecutionContextCreate,
    /// An execution context changed.
    ConfigurationControlExecutionContextUpdate,
    /// An execution context was removed.
    ConfigurationControlExecutionContextRemove,
    /// A source was appended.
    ConfigurationControlSourceContextCreate,
    /// A source was replaced or its filters changed.
    ConfigurationControlSourceContextUpdate,
    /// A source was removed.
    ConfigurationControlSourceContextRemove,
    /// Immediate dispatch of a start command.
    FlowControlExecuteNowStart,
    /// Immediate dispatch of an execute command.
    FlowControlExecuteNowExecute,
    /// Immediate dispatch of an update command.
    FlowControlExecuteNowUpdate,
    /// Immediate dispatch of a stop command.
    FlowControlExecuteNowStop,
    /// Batch dispatch of a start command.
    FlowControlExecuteParallelStart,
    /// Batch dispatch of an execute command.
    FlowControlExecuteParallelExecute,
    /// Batch dispatch of an update command.
    FlowControlExecuteParallelUpdate,
    /// Batch dispatch of a stop command.
    FlowControlExecuteParallelStop,
    /// Waiting-tacts hint of a batch dispatch.
    FlowControlExecuteParallelWaitingTacts,
}

impl MessageType {
    /// Control kind for an immediate dispatch of `command`.
    pub fn execute_now(command: CommandType) -> Self {
        match command {
            CommandType::Start => Self::FlowControlExecuteNowStart,
            CommandType::Execute => Self::FlowControlExecuteNowExecute,
            CommandType::Update => Self::FlowControlExecuteNowUpdate,
            CommandType::Stop => Self::FlowControlExecuteNowStop,
        }
    }

    /// Control kind for a batch dispatch of `command`.
    pub fn execute_parallel(command: CommandType) -> Self {
        match command {
            CommandType::Start => Self::FlowControlExecuteParallelStart,
            CommandType::Execute => Self::FlowControlExecuteParallelExecute,
            CommandType::Update => Self::FlowControlExecuteParallelUpdate,
            CommandType::Stop => Self::FlowControlExecuteParallelStop,
        }
    }

    /// True for the error kinds a failed action carries.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error | Self::ActionError)
    }
}

/// A typed value tagged with its meaning and emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    value: Value,
    #[serde(rename = "type", default)]
    message_type: MessageType,
    date: SystemTime,
}

impl Message {
    /// Create a message stamped now.
    pub fn new(value: impl Into<Value>, message_type: MessageType) -> Self {
        Self::at(value, message_type, SystemTime::now())
    }

    /// Create a message with an explicit timestamp.
    pub fn at(value: impl Into<Value>, message_type: MessageType, date: SystemTime) -> Self {
        Self {
            value: value.into(),
            message_type,
            date,
        }
    }

    /// Create a `DATA` message stamped now.
    pub fn data(value: impl Into<Value>) -> Self {
        Self::new(value, MessageType::Data)
    }

    /// Payload.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Kind of the payload.
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Meaning.
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Emission time.
    pub fn date(&self) -> SystemTime {
        self.date
    }

    /// Take the payload out.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Same kind and timestamp, different payload.
    pub fn map_value(self, f: impl FnOnce(Value) -> Value) -> Self {
        Self {
            value: f(self.value),
            message_type: self.message_type,
            date: self.date,
        }
    }
}

/// Ordered, append-only record of what a module emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputLog {
    messages: Vec<Message>,
}

impl OutputLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a control message of `kind` stamped now.
    pub fn control(&mut self, kind: MessageType, value: impl Into<Value>) {
        self.messages.push(Message::new(value, kind));
    }

    /// Append a batch of values of one kind sharing a single timestamp.
    pub fn batch<I, V>(&mut self, kind: MessageType, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let date = SystemTime::now();
        self.messages
            .extend(values.into_iter().map(|value| Message::at(value, kind, date)));
    }

    /// Append already-built messages.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    /// Everything logged so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drain the log, leaving it empty.
    pub fn take(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let m = Message::data(3);
        assert_eq!(m.message_type(), MessageType::Data);
        assert_eq!(m.value_type(), ValueType::Long);
        assert_eq!(MessageType::default(), MessageType::Data);
    }

    #[test]
    fn batch_shares_timestamp() {
        let mut log = OutputLog::new();
        log.batch(MessageType::Error, ["a", "b", "c"]);
        assert_eq!(log.len(), 3);
        let first = log.messages()[0].date();
        assert!(log.messages().iter().all(|m| m.date() == first));
        assert!(log.messages().iter().all(|m| m.message_type() == MessageType::Error));
    }

    #[test]
    fn control_kinds_serialize_screaming() {
        let json = serde_json::to_string(&MessageType::ConfigurationControlSourceContextRemove).unwrap();
        assert_eq!(json, "\"CONFIGURATION_CONTROL_SOURCE_CONTEXT_REMOVE\"");
        let json = serde_json::to_string(&MessageType::FlowControlExecuteParallelWaitingTacts).unwrap();
        assert_eq!(json, "\"FLOW_CONTROL_EXECUTE_PARALLEL_WAITING_TACTS\"");
    }

    #[test]
    fn take_drains() {
        let mut log = OutputLog::new();
        log.control(MessageType::ActionStart, 1);
        assert_eq!(log.take().len(), 1);
        assert!(log.is_empty());
    }
}
