//! Execution context handles.

use crate::configuration::ConfigurationRef;
use crate::source_list::SourceListRef;
use crate::state::{HostState, SharedState};
use crate::tree::ExecutionContextNode;
use smc_api::{ExecutionContextId, MessageType, ModuleError, WorkInterval};

/// An execution context of the tree, bound to its runtime's state.
#[derive(Debug, Clone)]
pub struct ExecutionContextRef {
    state: SharedState,
    id: ExecutionContextId,
}

impl ExecutionContextRef {
    /// Bind `id` to `state`.
    pub fn new(state: SharedState, id: ExecutionContextId) -> Self {
        Self { state, id }
    }

    /// Arena id.
    pub fn id(&self) -> ExecutionContextId {
        self.id
    }

    /// The state this handle is bound to.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    fn get<R>(&self, f: impl FnOnce(&ExecutionContextNode) -> R) -> Result<R, ModuleError> {
        self.state
            .read(|host| Ok(f(host.tree.execution_context(self.id)?)))
    }

    /// Apply `f` and, if it succeeds, report one `EXECUTION_CONTEXT_UPDATE`.
    fn update<R>(
        &self,
        f: impl FnOnce(&HostState, &ExecutionContextNode) -> Result<(), ModuleError>,
        apply: impl FnOnce(&mut ExecutionContextNode) -> R,
    ) -> Result<R, ModuleError> {
        self.state.write(|host| {
            f(host, host.tree.execution_context(self.id)?)?;
            let out = apply(host.tree.execution_context_mut(self.id)?);
            let path = host.tree.execution_context_path(self.id)?;
            host.output
                .control(MessageType::ConfigurationControlExecutionContextUpdate, path);
            Ok(out)
        })
    }

    fn same_state(&self, other: &SharedState) -> Result<(), ModuleError> {
        if self.state.same_as(other) {
            Ok(())
        } else {
            Err(ModuleError::invalid("handle belongs to another runtime"))
        }
    }

    /// Execution context name.
    pub fn name(&self) -> Result<String, ModuleError> {
        self.get(|node| node.name.clone())
    }

    /// Rename.
    pub fn set_name(&self, name: &str) -> Result<(), ModuleError> {
        self.update(|_, _| Ok(()), |node| node.name = name.to_owned())
    }

    /// Execution context type.
    pub fn kind(&self) -> Result<String, ModuleError> {
        self.get(|node| node.kind.clone())
    }

    /// Change the type.
    pub fn set_kind(&self, kind: &str) -> Result<(), ModuleError> {
        self.update(|_, _| Ok(()), |node| node.kind = kind.to_owned())
    }

    /// Work-interval bound.
    pub fn max_work_interval(&self) -> Result<WorkInterval, ModuleError> {
        self.get(|node| node.max_work_interval)
    }

    /// Change the work-interval bound.
    pub fn set_max_work_interval(&self, interval: WorkInterval) -> Result<(), ModuleError> {
        self.update(|_, _| Ok(()), |node| node.max_work_interval = interval)
    }

    /// Whether the context is enabled.
    pub fn is_enabled(&self) -> Result<bool, ModuleError> {
        self.get(|node| node.enabled)
    }

    /// Enable or disable.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), ModuleError> {
        self.update(|_, _| Ok(()), |node| node.enabled = enabled)
    }

    /// Always false: nothing really runs in the emulator.
    pub fn is_active(&self) -> bool {
        false
    }

    /// Owning configuration.
    pub fn configuration(&self) -> Result<ConfigurationRef, ModuleError> {
        let id = self.get(|node| node.configuration)?;
        Ok(ConfigurationRef::new(self.state.clone(), id))
    }

    /// Sources of this context.
    pub fn sources(&self) -> SourceListRef {
        SourceListRef::new(self.state.clone(), self.id, Vec::new())
    }

    /// Number of nested execution contexts.
    pub fn count_execution_contexts(&self) -> Result<usize, ModuleError> {
        self.get(|node| node.execution_contexts.len())
    }

    /// Nested execution context by position.
    pub fn execution_context(&self, index: usize) -> Result<ExecutionContextRef, ModuleError> {
        let id = self.get(|node| {
            ModuleError::check_index("execution context", index, node.execution_contexts.len())
                .map(|()| node.execution_contexts[index])
        })??;
        Ok(Self::new(self.state.clone(), id))
    }

    /// Insert a nested execution context at `index` (`0..=count`).
    pub fn insert_execution_context(
        &self,
        index: usize,
        execution_context: &ExecutionContextRef,
    ) -> Result<(), ModuleError> {
        self.same_state(&execution_context.state)?;
        let other = execution_context.id;
        self.update(
            |host, node| {
                host.tree.execution_context(other)?;
                ModuleError::check_index("execution context", index, node.execution_contexts.len() + 1)
            },
            |node| node.execution_contexts.insert(index, other),
        )
    }

    /// Replace the nested execution context at `index`.
    pub fn update_execution_context(
        &self,
        index: usize,
        execution_context: &ExecutionContextRef,
    ) -> Result<(), ModuleError> {
        self.same_state(&execution_context.state)?;
        let other = execution_context.id;
        self.update(
            |host, node| {
                host.tree.execution_context(other)?;
                ModuleError::check_index("execution context", index, node.execution_contexts.len())
            },
            |node| node.execution_contexts[index] = other,
        )
    }

    /// Drop the nested execution context at `index`. The node itself stays
    /// in its configuration.
    pub fn remove_execution_context(&self, index: usize) -> Result<(), ModuleError> {
        self.update(
            |_, node| ModuleError::check_index("execution context", index, node.execution_contexts.len()),
            |node| {
                node.execution_contexts.remove(index);
            },
        )
    }

    /// Number of managed configurations.
    pub fn count_managed_configurations(&self) -> Result<usize, ModuleError> {
        self.get(|node| node.managed_configurations.len())
    }

    /// Managed configuration by position.
    pub fn managed_configuration(&self, index: usize) -> Result<ConfigurationRef, ModuleError> {
        let id = self.get(|node| {
            ModuleError::check_index("managed configuration", index, node.managed_configurations.len())
                .map(|()| node.managed_configurations[index])
        })??;
        Ok(ConfigurationRef::new(self.state.clone(), id))
    }

    /// Insert a managed configuration at `index` (`0..=count`).
    pub fn insert_managed_configuration(
        &self,
        index: usize,
        configuration: &ConfigurationRef,
    ) -> Result<(), ModuleError> {
        self.same_state(configuration.state())?;
        let other = configuration.id();
        self.update(
            |host, node| {
                host.tree.configuration(other)?;
                ModuleError::check_index(
                    "managed configuration",
                    index,
                    node.managed_configurations.len() + 1,
                )
            },
            |node| node.managed_configurations.insert(index, other),
        )
    }

    /// Replace the managed configuration at `index`.
    pub fn update_managed_configuration(
        &self,
        index: usize,
        configuration: &ConfigurationRef,
    ) -> Result<(), ModuleError> {
        self.same_state(configuration.state())?;
        let other = configuration.id();
        self.update(
            |host, node| {
                host.tree.configuration(other)?;
                ModuleError::check_index("managed configuration", index, node.managed_configurations.len())
            },
            |node| node.managed_configurations[index] = other,
        )
    }

    /// Drop the managed configuration at `index` from this context's list.
    pub fn remove_managed_configuration(&self, index: usize) -> Result<(), ModuleError> {
        self.update(
            |_, node| {
                ModuleError::check_index("managed configuration", index, node.managed_configurations.len())
            },
            |node| {
                node.managed_configurations.remove(index);
            },
        )
    }
}
