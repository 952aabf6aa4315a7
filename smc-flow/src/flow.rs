//! Dispatch of managed units and retrieval of what they produced.

use crate::scheduler::{Batch, Scheduler, SequentialScheduler};
use smc_api::{
    Action, ActionType, Command, CommandType, ExecutionContextId, ManagedUnit, MessageType,
    ModuleError, TaskHandle, Value, WorkInterval, filter_actions,
};
use smc_config::{ExecutionContextRef, SharedState, SourceData};
use std::collections::BTreeMap;

/// Bookkeeping for one parallel dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Command that was dispatched.
    pub command: CommandType,
    /// Slots the batch covered, in dispatch order.
    pub managed_ids: Vec<usize>,
    /// Scheduling hint carried in the waiting-tacts message.
    pub waiting_tacts: u32,
    /// Work-interval bound requested by the caller.
    pub max_work_interval: WorkInterval,
}

/// Dispatches commands to managed units and buffers one result per slot.
///
/// Each dispatch first announces itself on the shared output log, then
/// runs through the [`Scheduler`]. A later dispatch to a slot always
/// replaces the earlier result. Unit failures propagate to the caller.
pub struct FlowController {
    state: SharedState,
    units: Vec<Box<dyn ManagedUnit>>,
    links: Vec<Option<ExecutionContextId>>,
    buffer: Vec<Option<Action>>,
    tasks: BTreeMap<TaskHandle, Task>,
    next_task: u64,
    scheduler: Box<dyn Scheduler>,
}

impl FlowController {
    /// Create a controller with no units, logging into `state`.
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            units: Vec::new(),
            links: Vec::new(),
            buffer: Vec::new(),
            tasks: BTreeMap::new(),
            next_task: 0,
            scheduler: Box::new(SequentialScheduler),
        }
    }

    /// Replace the scheduler.
    pub fn with_scheduler(mut self, scheduler: Box<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Add a unit; returns its slot id.
    pub fn register(&mut self, unit: Box<dyn ManagedUnit>) -> usize {
        self.units.push(unit);
        self.links.push(None);
        self.buffer.push(None);
        self.units.len() - 1
    }

    /// Add a unit standing for an execution context of the tree. Sources
    /// that reference that context read this slot.
    pub fn register_linked(&mut self, unit: Box<dyn ManagedUnit>, execution_context: ExecutionContextId) -> usize {
        let id = self.register(unit);
        self.links[id] = Some(execution_context);
        id
    }

    /// Number of managed slots.
    pub fn count_managed_execution_contexts(&self) -> usize {
        self.units.len()
    }

    /// The execution context linked to a slot.
    pub fn managed_execution_context(&self, managed_id: usize) -> Result<ExecutionContextRef, ModuleError> {
        self.check_slot(managed_id)?;
        self.links[managed_id]
            .map(|id| ExecutionContextRef::new(self.state.clone(), id))
            .ok_or_else(|| ModuleError::invalid(format!("managed unit {managed_id} has no execution context")))
    }

    fn check_slot(&self, managed_id: usize) -> Result<(), ModuleError> {
        ModuleError::check_index("managed execution context", managed_id, self.units.len())
    }

    /// Run one unit now and buffer its result under `managed_id`.
    pub async fn execute_now(
        &mut self,
        command: CommandType,
        managed_id: usize,
        values: Option<Vec<Value>>,
    ) -> Result<(), ModuleError> {
        self.check_slot(managed_id)?;
        self.state.write(|host| {
            host.output
                .control(MessageType::execute_now(command), Value::from(managed_id));
            Ok(())
        })?;
        tracing::debug!(?command, managed_id, "execute now");
        let ids = [managed_id];
        let batch = Batch {
            command,
            managed_ids: &ids,
            values,
            task: None,
        };
        self.scheduler
            .run(batch, &mut self.units, &mut self.buffer)
            .await
    }

    /// Run several units as one task. Every id is checked before anything
    /// is announced; then one message per id and a waiting-tacts message
    /// are logged, and the units run through the scheduler.
    pub async fn execute_parallel(
        &mut self,
        command: CommandType,
        managed_ids: &[usize],
        values: Option<Vec<Value>>,
        waiting_tacts: Option<u32>,
        max_work_interval: WorkInterval,
    ) -> Result<TaskHandle, ModuleError> {
        if managed_ids.is_empty() {
            return Err(ModuleError::invalid("no managed ids to execute"));
        }
        for &id in managed_ids {
            self.check_slot(id)?;
        }
        let waiting_tacts = waiting_tacts.unwrap_or(0);
        self.state.write(|host| {
            for &id in managed_ids {
                host.output
                    .control(MessageType::execute_parallel(command), Value::from(id));
            }
            host.output.control(
                MessageType::FlowControlExecuteParallelWaitingTacts,
                Value::from(waiting_tacts),
            );
            Ok(())
        })?;

        let handle = TaskHandle::new(self.next_task);
        self.next_task += 1;
        self.tasks.insert(
            handle,
            Task {
                command,
                managed_ids: managed_ids.to_vec(),
                waiting_tacts,
                max_work_interval,
            },
        );
        tracing::debug!(?command, ?managed_ids, task = %handle, "execute parallel");

        let batch = Batch {
            command,
            managed_ids,
            values,
            task: Some(handle),
        };
        self.scheduler
            .run(batch, &mut self.units, &mut self.buffer)
            .await?;
        Ok(handle)
    }

    /// `EXECUTE` actions of a slot, keeping only their `DATA` messages.
    /// Empty when the slot never ran. `task` does not gate the read.
    pub fn messages_from_executed(&self, task: TaskHandle, managed_id: usize) -> Result<Vec<Action>, ModuleError> {
        self.check_slot(managed_id)?;
        tracing::trace!(task = %task, managed_id, "reading executed messages");
        Ok(match &self.buffer[managed_id] {
            Some(action) => filter_actions(
                std::slice::from_ref(action),
                Some(ActionType::Execute),
                Some(MessageType::Data),
            ),
            None => Vec::new(),
        })
    }

    /// The slot's result, unfiltered, wrapped in one `EXECUTE` command.
    /// Empty when the slot never ran. `task` does not gate the read.
    pub fn commands_from_executed(&self, task: TaskHandle, managed_id: usize) -> Result<Vec<Command>, ModuleError> {
        self.check_slot(managed_id)?;
        tracing::trace!(task = %task, managed_id, "reading executed commands");
        Ok(match &self.buffer[managed_id] {
            Some(action) => vec![Command::execute(vec![action.clone()])],
            None => Vec::new(),
        })
    }

    /// Raw buffered result of a slot.
    pub fn executed(&self, managed_id: usize) -> Result<Option<&Action>, ModuleError> {
        self.check_slot(managed_id)?;
        Ok(self.buffer[managed_id].as_ref())
    }

    /// Bookkeeping of a live task.
    pub fn task(&self, task: TaskHandle) -> Option<&Task> {
        self.tasks.get(&task)
    }

    /// End a task. Buffered slot results stay readable.
    pub fn release_thread(&mut self, task: TaskHandle) -> Result<Task, ModuleError> {
        self.release(task, "thread")
    }

    /// Drop the cached bookkeeping of a task. Buffered slot results stay
    /// readable.
    pub fn release_thread_cache(&mut self, task: TaskHandle) -> Result<Task, ModuleError> {
        self.release(task, "thread cache")
    }

    fn release(&mut self, task: TaskHandle, what: &str) -> Result<Task, ModuleError> {
        let released = self
            .tasks
            .remove(&task)
            .ok_or_else(|| ModuleError::invalid(format!("unknown task {task}")))?;
        tracing::debug!(task = %task, "released {what}");
        Ok(released)
    }

    /// Whether a task still has work in flight.
    pub fn is_thread_active(&self, task: TaskHandle) -> bool {
        self.scheduler.is_active(task)
    }
}

impl SourceData for FlowController {
    fn execution_context_actions(&self, id: ExecutionContextId) -> Vec<Action> {
        self.links
            .iter()
            .zip(&self.buffer)
            .filter(|(link, _)| **link == Some(id))
            .filter_map(|(_, action)| action.clone())
            .collect()
    }
}

impl std::fmt::Debug for FlowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowController")
            .field("units", &self.units.len())
            .field("links", &self.links)
            .field("buffer", &self.buffer)
            .field("tasks", &self.tasks)
            .finish()
    }
}
