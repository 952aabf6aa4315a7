//! CountingUnit: reports how many times it has run.

use crate::action::{Action, CommandType};
use crate::error::ModuleError;
use crate::message::{Message, MessageType};
use crate::unit::ManagedUnit;
use crate::value::Value;
use async_trait::async_trait;

/// Answers every command with one DATA message holding the call count
/// (starting at 1), followed by a LOG message naming the command.
#[derive(Default)]
pub struct CountingUnit {
    calls: i64,
}

impl CountingUnit {
    /// Create a unit that has not run yet.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ManagedUnit for CountingUnit {
    async fn execute(
        &mut self,
        command: CommandType,
        _values: Option<Vec<Value>>,
    ) -> Result<Action, ModuleError> {
        self.calls += 1;
        Ok(Action::execute(vec![
            Message::data(self.calls),
            Message::new(format!("{command:?}"), MessageType::Log),
        ]))
    }
}
