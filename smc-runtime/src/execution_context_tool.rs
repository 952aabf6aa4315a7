//! The module's view of the execution context it runs in.

use smc_api::{
    Action, ActionType, Command, ExecutionContextId, Message, MessageType, ModuleError, Value,
    filter_actions,
};
use smc_config::{ExecutionContextRef, SharedState, SourceData};
use smc_flow::{ConfigurationController, FlowController};
use std::ops::Range;

/// Input, output and control surfaces handed to [`Module::process`].
///
/// Input arrives pre-partitioned: one list of actions per source id.
/// Output goes to the runtime's shared log, interleaved with the control
/// messages the module's tree changes and dispatches produce.
///
/// [`Module::process`]: crate::Module::process
#[derive(Debug)]
pub struct ExecutionContextTool {
    execution_context: ExecutionContextRef,
    input: Vec<Vec<Action>>,
    flow: FlowController,
    control: ConfigurationController,
}

/// Slice like a clamped `from..to`: out-of-range bounds shrink to fit and a
/// reversed range is empty.
fn slice<T>(items: Vec<T>, range: Option<Range<usize>>) -> Vec<T> {
    match range {
        None => items,
        Some(range) => {
            let end = range.end.min(items.len());
            let start = range.start.min(end);
            items.into_iter().skip(start).take(end - start).collect()
        }
    }
}

impl ExecutionContextTool {
    /// Assemble a tool around the module's own execution context.
    pub fn new(
        execution_context: ExecutionContextRef,
        input: Vec<Vec<Action>>,
        flow: FlowController,
        control: ConfigurationController,
    ) -> Self {
        Self {
            execution_context,
            input,
            flow,
            control,
        }
    }

    /// The module's own execution context.
    pub fn execution_context(&self) -> &ExecutionContextRef {
        &self.execution_context
    }

    /// The runtime's shared state.
    pub fn state(&self) -> &SharedState {
        self.execution_context.state()
    }

    fn emit(&self, f: impl FnOnce(&mut smc_api::OutputLog)) -> Result<(), ModuleError> {
        self.state().write(|host| {
            f(&mut host.output);
            Ok(())
        })
    }

    /// Append one `DATA` message.
    pub fn add_message(&mut self, value: impl Into<Value>) -> Result<(), ModuleError> {
        let value = value.into();
        self.emit(|log| log.control(MessageType::Data, value))
    }

    /// Append `DATA` messages sharing one timestamp.
    pub fn add_messages<I, V>(&mut self, values: I) -> Result<(), ModuleError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.emit(|log| log.batch(MessageType::Data, values))
    }

    /// Append one `ERROR` message.
    pub fn add_error(&mut self, value: impl Into<Value>) -> Result<(), ModuleError> {
        let value = value.into();
        self.emit(|log| log.control(MessageType::Error, value))
    }

    /// Append `ERROR` messages sharing one timestamp.
    pub fn add_errors<I, V>(&mut self, values: I) -> Result<(), ModuleError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.emit(|log| log.batch(MessageType::Error, values))
    }

    /// Append one `LOG` message.
    pub fn add_log(&mut self, value: impl Into<Value>) -> Result<(), ModuleError> {
        let value = value.into();
        self.emit(|log| log.control(MessageType::Log, value))
    }

    /// Snapshot of the output log.
    pub fn output(&self) -> Result<Vec<Message>, ModuleError> {
        self.state().read(|host| Ok(host.output.messages().to_vec()))
    }

    /// Number of input sources.
    pub fn count_source(&self) -> usize {
        self.input.len()
    }

    /// Every action of one source, unfiltered.
    pub fn messages_all(&self, source: usize) -> Result<&[Action], ModuleError> {
        ModuleError::check_index("source", source, self.input.len())?;
        Ok(&self.input[source])
    }

    /// Number of actions of one source.
    pub fn count_commands(&self, source: usize) -> Result<usize, ModuleError> {
        Ok(self.messages_all(source)?.len())
    }

    /// `EXECUTE` actions of a source reduced to their `DATA` messages,
    /// optionally sliced.
    pub fn get_messages(&self, source: usize, range: Option<Range<usize>>) -> Result<Vec<Action>, ModuleError> {
        let actions = filter_actions(
            self.messages_all(source)?,
            Some(ActionType::Execute),
            Some(MessageType::Data),
        );
        Ok(slice(actions, range))
    }

    /// The whole source as one `EXECUTE` command. The range slices that
    /// one-element list, not the actions inside it.
    pub fn get_commands(&self, source: usize, range: Option<Range<usize>>) -> Result<Vec<Command>, ModuleError> {
        let command = Command::execute(self.messages_all(source)?.to_vec());
        Ok(slice(vec![command], range))
    }

    /// True for a missing or empty action, or one carrying an error message.
    pub fn is_error(&self, action: Option<&Action>) -> bool {
        action.is_none_or(Action::is_error)
    }

    /// Number of actions buffered for a managed execution context.
    pub fn count_commands_from_execution_context(
        &self,
        execution_context: &ExecutionContextRef,
    ) -> Result<usize, ModuleError> {
        execution_context.name()?;
        Ok(self.flow.execution_context_actions(execution_context.id()).len())
    }

    /// What a managed execution context produced, as one `EXECUTE`
    /// command, optionally sliced like [`Self::get_commands`]. Empty while
    /// nothing has run.
    pub fn get_commands_from_execution_context(
        &self,
        execution_context: &ExecutionContextRef,
        range: Option<Range<usize>>,
    ) -> Result<Vec<Command>, ModuleError> {
        execution_context.name()?;
        let actions = self.flow.execution_context_actions(execution_context.id());
        if actions.is_empty() {
            return Ok(Vec::new());
        }
        Ok(slice(vec![Command::execute(actions)], range))
    }

    /// Resolve the sources declared on the module's execution context.
    /// Caller sources read this tool's input; execution-context sources
    /// read the flow controller's buffers.
    pub fn resolve_sources(&self) -> Result<Vec<Vec<Message>>, ModuleError> {
        let data = RuntimeData {
            flow: &self.flow,
            input: &self.input,
        };
        self.execution_context.sources().resolve(&data)
    }

    /// Roster of managed configurations.
    pub fn configuration_control(&mut self) -> &mut ConfigurationController {
        &mut self.control
    }

    /// Dispatch of managed execution contexts.
    pub fn flow_control(&mut self) -> &mut FlowController {
        &mut self.flow
    }

    /// Nothing ever asks a module to stop early in the emulator.
    pub fn is_need_stop(&self) -> bool {
        false
    }

    /// Replace the input for the next round.
    pub fn set_input(&mut self, input: Vec<Vec<Action>>) {
        self.input = input;
    }
}

struct RuntimeData<'a> {
    flow: &'a FlowController,
    input: &'a [Vec<Action>],
}

impl SourceData for RuntimeData<'_> {
    fn execution_context_actions(&self, id: ExecutionContextId) -> Vec<Action> {
        self.flow.execution_context_actions(id)
    }

    fn caller_actions(&self) -> Vec<Action> {
        self.input.iter().flatten().cloned().collect()
    }

    /// Relative names are source ids.
    fn caller_relative_actions(&self, name: &str) -> Vec<Action> {
        name.parse::<usize>()
            .ok()
            .and_then(|id| self.input.get(id))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slicing_clamps() {
        let items = vec![1, 2, 3];
        assert_eq!(slice(items.clone(), None), [1, 2, 3]);
        assert_eq!(slice(items.clone(), Some(1..10)), [2, 3]);
        assert_eq!(slice(items.clone(), Some(5..9)), Vec::<i32>::new());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 2..1;
        assert!(slice(items, Some(reversed)).is_empty());
    }
}
