//! Configuration handles: settings, variables, execution contexts.

use crate::container::ContainerRef;
use crate::execution_context::ExecutionContextRef;
use crate::state::SharedState;
use crate::tree::ConfigurationNode;
use smc_api::{
    ConfigurationId, MessageType, ModuleDescriptor, ModuleError, Value, WorkInterval,
};
use std::collections::BTreeMap;

/// A configuration of the tree, bound to its runtime's state.
#[derive(Debug, Clone)]
pub struct ConfigurationRef {
    state: SharedState,
    id: ConfigurationId,
}

/// Store `value` under `key`, keeping the kind an existing key already has.
fn put_typed(
    map: &mut BTreeMap<String, Value>,
    what: &str,
    key: &str,
    value: Value,
) -> Result<(), ModuleError> {
    if key.is_empty() {
        return Err(ModuleError::invalid(format!("{what} key is empty")));
    }
    if let Some(existing) = map.get(key) {
        if existing.value_type() != value.value_type() {
            return Err(ModuleError::invalid(format!(
                "wrong type for {what} {key}: holds {:?}, got {:?}",
                existing.value_type(),
                value.value_type()
            )));
        }
    }
    map.insert(key.to_owned(), value);
    Ok(())
}

impl ConfigurationRef {
    /// Bind `id` to `state`.
    pub fn new(state: SharedState, id: ConfigurationId) -> Self {
        Self { state, id }
    }

    /// Arena id.
    pub fn id(&self) -> ConfigurationId {
        self.id
    }

    /// The state this handle is bound to.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    fn get<R>(&self, f: impl FnOnce(&ConfigurationNode) -> R) -> Result<R, ModuleError> {
        self.state
            .read(|host| Ok(f(host.tree.configuration(self.id)?)))
    }

    /// Apply `f` and report the change as one `CONFIGURATION_UPDATE`.
    fn update(&self, f: impl FnOnce(&mut ConfigurationNode)) -> Result<(), ModuleError> {
        self.state.write(|host| {
            let node = host.tree.configuration_mut(self.id)?;
            f(node);
            let name = node.name.clone();
            host.output
                .control(MessageType::ConfigurationControlConfigurationUpdate, name);
            Ok(())
        })
    }

    /// Configuration name.
    pub fn name(&self) -> Result<String, ModuleError> {
        self.get(|node| node.name.clone())
    }

    /// Rename.
    pub fn set_name(&self, name: &str) -> Result<(), ModuleError> {
        self.update(|node| node.name = name.to_owned())
    }

    /// Free-form description.
    pub fn description(&self) -> Result<Option<String>, ModuleError> {
        self.get(|node| node.description.clone())
    }

    /// Module this configuration instantiates.
    pub fn module(&self) -> Result<ModuleDescriptor, ModuleError> {
        self.get(|node| node.module.clone())
    }

    /// Owning container.
    pub fn container(&self) -> Result<Option<ContainerRef>, ModuleError> {
        let container = self.get(|node| node.container)?;
        Ok(container.map(|id| ContainerRef::new(self.state.clone(), id)))
    }

    /// Move to another container, or detach with `None`.
    pub fn set_container(&self, container: Option<&ContainerRef>) -> Result<(), ModuleError> {
        let target = container.map(ContainerRef::id);
        self.state
            .write(|host| host.tree.set_configuration_container(self.id, target))
    }

    /// All settings.
    pub fn settings(&self) -> Result<BTreeMap<String, Value>, ModuleError> {
        self.get(|node| node.settings.clone())
    }

    /// One setting.
    pub fn setting(&self, key: &str) -> Result<Option<Value>, ModuleError> {
        self.get(|node| node.settings.get(key).cloned())
    }

    /// Write a setting. A key keeps the kind of its first value.
    pub fn set_setting(&self, key: &str, value: impl Into<Value>) -> Result<(), ModuleError> {
        let value = value.into();
        self.state.write(|host| {
            let node = host.tree.configuration_mut(self.id)?;
            put_typed(&mut node.settings, "setting", key, value)?;
            let payload = format!("{} {key}", node.name);
            host.output.control(
                MessageType::ConfigurationControlConfigurationSettingUpdate,
                payload,
            );
            Ok(())
        })
    }

    /// All variables.
    pub fn variables(&self) -> Result<BTreeMap<String, Value>, ModuleError> {
        self.get(|node| node.variables.clone())
    }

    /// One variable.
    pub fn variable(&self, key: &str) -> Result<Option<Value>, ModuleError> {
        self.get(|node| node.variables.get(key).cloned())
    }

    /// Write a variable. A key keeps the kind of its first value.
    pub fn set_variable(&self, key: &str, value: impl Into<Value>) -> Result<(), ModuleError> {
        let value = value.into();
        self.state.write(|host| {
            let node = host.tree.configuration_mut(self.id)?;
            put_typed(&mut node.variables, "variable", key, value)?;
            let payload = format!("{} {key}", node.name);
            host.output.control(
                MessageType::ConfigurationControlConfigurationVariableUpdate,
                payload,
            );
            Ok(())
        })
    }

    /// Remove a variable; reports whether it existed. The removal is
    /// announced either way.
    pub fn remove_variable(&self, key: &str) -> Result<bool, ModuleError> {
        if key.is_empty() {
            return Err(ModuleError::invalid("variable key is empty"));
        }
        self.state.write(|host| {
            let node = host.tree.configuration_mut(self.id)?;
            let existed = node.variables.remove(key).is_some();
            let payload = format!("{} {key}", node.name);
            host.output.control(
                MessageType::ConfigurationControlConfigurationVariableRemove,
                payload,
            );
            Ok(existed)
        })
    }

    /// Output buffer size.
    pub fn buffer_size(&self) -> Result<usize, ModuleError> {
        self.get(|node| node.buffer_size)
    }

    /// Set the output buffer size.
    pub fn set_buffer_size(&self, size: usize) -> Result<(), ModuleError> {
        self.update(|node| node.buffer_size = size)
    }

    /// Per-thread buffer size.
    pub fn thread_buffer_size(&self) -> Result<usize, ModuleError> {
        self.get(|node| node.thread_buffer_size)
    }

    /// Set the per-thread buffer size.
    pub fn set_thread_buffer_size(&self, size: usize) -> Result<(), ModuleError> {
        self.update(|node| node.thread_buffer_size = size)
    }

    /// Whether the configuration is enabled.
    pub fn is_enabled(&self) -> Result<bool, ModuleError> {
        self.get(|node| node.enabled)
    }

    /// Enable or disable.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), ModuleError> {
        self.update(|node| node.enabled = enabled)
    }

    /// Always false: nothing really runs in the emulator.
    pub fn is_active(&self) -> bool {
        false
    }

    /// Number of execution contexts.
    pub fn count_execution_contexts(&self) -> Result<usize, ModuleError> {
        self.get(|node| node.execution_contexts.len())
    }

    /// Execution context by position.
    pub fn execution_context(&self, index: usize) -> Result<ExecutionContextRef, ModuleError> {
        let id = self.state.read(|host| {
            let ids = host.tree.configuration(self.id)?.execution_context_ids();
            ModuleError::check_index("execution context", index, ids.len())?;
            Ok(ids[index])
        })?;
        Ok(ExecutionContextRef::new(self.state.clone(), id))
    }

    /// Append an execution context. `kind` defaults to `"default"`.
    pub fn create_execution_context(
        &self,
        name: &str,
        kind: Option<&str>,
        max_work_interval: WorkInterval,
    ) -> Result<ExecutionContextRef, ModuleError> {
        let id = self.state.write(|host| {
            let id = host.tree.add_execution_context(
                self.id,
                name,
                kind.map(str::to_owned),
                max_work_interval,
            )?;
            let path = host.tree.execution_context_path(id)?;
            host.output
                .control(MessageType::ConfigurationControlExecutionContextCreate, path);
            Ok(id)
        })?;
        Ok(ExecutionContextRef::new(self.state.clone(), id))
    }

    /// Rewrite the `index`-th execution context in place; its sources and
    /// links are kept. Emits a single update.
    pub fn update_execution_context(
        &self,
        index: usize,
        name: &str,
        kind: Option<&str>,
        max_work_interval: WorkInterval,
    ) -> Result<ExecutionContextRef, ModuleError> {
        let id = self.state.write(|host| {
            let ids = host.tree.configuration(self.id)?.execution_context_ids();
            ModuleError::check_index("execution context", index, ids.len())?;
            let id = ids[index];
            let node = host.tree.execution_context_mut(id)?;
            node.name = name.to_owned();
            node.kind = kind.unwrap_or("default").to_owned();
            node.max_work_interval = max_work_interval;
            let path = host.tree.execution_context_path(id)?;
            host.output
                .control(MessageType::ConfigurationControlExecutionContextUpdate, path);
            Ok(id)
        })?;
        Ok(ExecutionContextRef::new(self.state.clone(), id))
    }

    /// Remove the `index`-th execution context.
    pub fn remove_execution_context(&self, index: usize) -> Result<(), ModuleError> {
        self.state.write(|host| {
            let removed = host.tree.remove_execution_context(self.id, index)?;
            let cfg = host.tree.configuration(self.id)?;
            let payload = format!("{}.{}", cfg.name(), removed.name());
            host.output
                .control(MessageType::ConfigurationControlExecutionContextRemove, payload);
            Ok(())
        })
    }
}
