//! The managed-unit protocol.

use crate::action::{Action, CommandType};
use crate::error::ModuleError;
use crate::value::Value;
use async_trait::async_trait;

/// A unit the flow controller can dispatch commands to.
///
/// Implementations run one command with optional input values and report
/// what they produced as a single [`Action`]. The controller buffers that
/// action under the unit's slot until the next dispatch to the same slot.
#[async_trait]
pub trait ManagedUnit: Send {
    /// Run `command` once.
    async fn execute(
        &mut self,
        command: CommandType,
        values: Option<Vec<Value>>,
    ) -> Result<Action, ModuleError>;
}

/// Adapts a synchronous closure into a [`ManagedUnit`].
pub struct FnUnit<F>(F);

impl<F> FnUnit<F>
where
    F: FnMut(CommandType, Option<Vec<Value>>) -> Result<Action, ModuleError> + Send,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> ManagedUnit for FnUnit<F>
where
    F: FnMut(CommandType, Option<Vec<Value>>) -> Result<Action, ModuleError> + Send,
{
    async fn execute(
        &mut self,
        command: CommandType,
        values: Option<Vec<Value>>,
    ) -> Result<Action, ModuleError> {
        (self.0)(command, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_runs_through_trait_object() {
        let mut calls = 0;
        let mut unit: Box<dyn ManagedUnit> = Box::new(FnUnit::new(move |command, values| {
            calls += 1;
            assert_eq!(command, CommandType::Execute);
            Ok(Action::data(values.unwrap_or_default().into_iter().chain([Value::from(calls)])))
        }));
        let action = unit
            .execute(CommandType::Execute, Some(vec![Value::from("x")]))
            .await
            .unwrap();
        assert_eq!(action.messages().len(), 2);
        let again = unit.execute(CommandType::Execute, None).await.unwrap();
        assert_eq!(again.messages()[0].value(), &Value::Long(2));
    }
}
