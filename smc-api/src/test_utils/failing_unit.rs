//! FailingUnit: always fails.

use crate::action::{Action, CommandType};
use crate::error::ModuleError;
use crate::unit::ManagedUnit;
use crate::value::Value;
use async_trait::async_trait;

/// A unit whose every run fails with [`ModuleError::Failure`].
pub struct FailingUnit {
    reason: String,
}

impl FailingUnit {
    /// Fail with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ManagedUnit for FailingUnit {
    async fn execute(
        &mut self,
        _command: CommandType,
        _values: Option<Vec<Value>>,
    ) -> Result<Action, ModuleError> {
        Err(ModuleError::failure(self.reason.clone()))
    }
}
