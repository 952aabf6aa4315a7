//! The module's roster of configurations it manages.

use smc_api::{ConfigurationId, MessageType, ModuleDescriptor, ModuleError};
use smc_config::{ConfigurationRef, ContainerRef, SharedState};

/// Creates and removes configurations on behalf of a module and keeps the
/// ordered list of the ones it manages.
///
/// Cardinality bounds from the module catalog are not enforced here.
#[derive(Debug, Clone)]
pub struct ConfigurationController {
    state: SharedState,
    modules: Vec<ModuleDescriptor>,
    managed: Vec<ConfigurationId>,
}

impl ConfigurationController {
    /// A controller offering `modules`, with an empty roster.
    pub fn new(state: SharedState, modules: Vec<ModuleDescriptor>) -> Self {
        Self {
            state,
            modules,
            managed: Vec::new(),
        }
    }

    /// Put an existing configuration at the end of the roster without
    /// reporting it.
    pub fn adopt(&mut self, configuration: &ConfigurationRef) -> Result<(), ModuleError> {
        let id = configuration.id();
        self.state.read(|host| host.tree.configuration(id).map(|_| ()))?;
        self.managed.push(id);
        Ok(())
    }

    /// Modules that can be instantiated.
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Number of managed configurations.
    pub fn count_managed_configurations(&self) -> usize {
        self.managed.len()
    }

    /// Managed configuration by roster position.
    pub fn managed_configuration(&self, index: usize) -> Result<ConfigurationRef, ModuleError> {
        ModuleError::check_index("managed configuration", index, self.managed.len())?;
        Ok(ConfigurationRef::new(self.state.clone(), self.managed[index]))
    }

    /// The whole roster, in order.
    pub fn managed_configurations(&self) -> Vec<ConfigurationRef> {
        self.managed
            .iter()
            .map(|id| ConfigurationRef::new(self.state.clone(), *id))
            .collect()
    }

    /// Managed configurations held directly by `container`.
    pub fn managed_configurations_in(&self, container: &ContainerRef) -> Result<Vec<ConfigurationRef>, ModuleError> {
        let held = self
            .state
            .read(|host| Ok(host.tree.container(container.id())?.configuration_ids().to_vec()))?;
        Ok(self
            .managed
            .iter()
            .filter(|id| held.contains(id))
            .map(|id| ConfigurationRef::new(self.state.clone(), *id))
            .collect())
    }

    /// Create a configuration of `module` in `container` and insert it at
    /// `index` (`0..=count`) of the roster.
    pub fn create_configuration(
        &mut self,
        index: usize,
        container: &ContainerRef,
        module: &ModuleDescriptor,
        name: &str,
    ) -> Result<ConfigurationRef, ModuleError> {
        ModuleError::check_index("managed configuration", index, self.managed.len() + 1)?;
        let id = self.state.write(|host| {
            let id = host
                .tree
                .add_configuration(Some(container.id()), module.clone(), name, None)?;
            host.output
                .control(MessageType::ConfigurationControlConfigurationCreate, name);
            Ok(id)
        })?;
        self.managed.insert(index, id);
        tracing::debug!(configuration = %id, module = module.name(), name, "configuration created");
        Ok(ConfigurationRef::new(self.state.clone(), id))
    }

    /// Remove the managed configuration at `index` from its container, the
    /// roster and the tree.
    pub fn remove_managed_configuration(&mut self, index: usize) -> Result<(), ModuleError> {
        ModuleError::check_index("managed configuration", index, self.managed.len())?;
        let id = self.managed[index];
        let name = self.state.write(|host| {
            let removed = host.tree.remove_configuration(id)?;
            let name = removed.name().to_owned();
            host.output
                .control(MessageType::ConfigurationControlConfigurationRemove, name.clone());
            Ok(name)
        })?;
        self.managed.remove(index);
        tracing::debug!(configuration = %id, name = %name, "configuration removed");
        Ok(())
    }
}
