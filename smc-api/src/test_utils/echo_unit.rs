//! EchoUnit: returns the dispatched values as DATA messages.

use crate::action::{Action, CommandType};
use crate::error::ModuleError;
use crate::unit::ManagedUnit;
use crate::value::Value;
use async_trait::async_trait;

/// Echoes the dispatched values back as one `EXECUTE` action.
/// Yields to the runtime once so dispatch really crosses an await point.
pub struct EchoUnit;

#[async_trait]
impl ManagedUnit for EchoUnit {
    async fn execute(
        &mut self,
        _command: CommandType,
        values: Option<Vec<Value>>,
    ) -> Result<Action, ModuleError> {
        tokio::task::yield_now().await;
        Ok(Action::data(values.unwrap_or_default()))
    }
}
