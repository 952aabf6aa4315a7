//! The seam that decides how a dispatch batch runs.

use async_trait::async_trait;
use smc_api::{Action, CommandType, ManagedUnit, ModuleError, TaskHandle, Value};

/// One dispatch: a command for a set of managed slots.
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    /// Command sent to every unit.
    pub command: CommandType,
    /// Slots to run, in order. Already validated by the controller.
    pub managed_ids: &'a [usize],
    /// Input values handed to every unit.
    pub values: Option<Vec<Value>>,
    /// Task the batch belongs to; `None` for immediate dispatch.
    pub task: Option<TaskHandle>,
}

/// Runs batches and stores each unit's result in its slot.
///
/// A slot is written as soon as its unit finishes, so when a unit fails
/// the slots of units that already ran keep their new results.
#[async_trait]
pub trait Scheduler: Send {
    /// Run `batch`, writing `buffer[id]` for every finished unit.
    async fn run(
        &mut self,
        batch: Batch<'_>,
        units: &mut [Box<dyn ManagedUnit>],
        buffer: &mut [Option<Action>],
    ) -> Result<(), ModuleError>;

    /// Whether `task` still has work in flight.
    fn is_active(&self, _task: TaskHandle) -> bool {
        false
    }
}

/// Runs units one after another, yielding between them. Every batch has
/// completed by the time `run` returns, so no task is ever active.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialScheduler;

#[async_trait]
impl Scheduler for SequentialScheduler {
    async fn run(
        &mut self,
        batch: Batch<'_>,
        units: &mut [Box<dyn ManagedUnit>],
        buffer: &mut [Option<Action>],
    ) -> Result<(), ModuleError> {
        for &id in batch.managed_ids {
            let unit = units
                .get_mut(id)
                .ok_or_else(|| ModuleError::invalid(format!("no managed unit {id}")))?;
            let action = unit.execute(batch.command, batch.values.clone()).await?;
            let slot = buffer
                .get_mut(id)
                .ok_or_else(|| ModuleError::invalid(format!("no buffer slot {id}")))?;
            *slot = Some(action);
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}
