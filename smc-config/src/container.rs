//! Container handles.

use crate::configuration::ConfigurationRef;
use crate::state::SharedState;
use smc_api::{ContainerId, MessageType, ModuleError};

/// A container of the tree, bound to its runtime's state.
#[derive(Debug, Clone)]
pub struct ContainerRef {
    state: SharedState,
    id: ContainerId,
}

impl ContainerRef {
    /// Bind `id` to `state`.
    pub fn new(state: SharedState, id: ContainerId) -> Self {
        Self { state, id }
    }

    /// The root container of `state`.
    pub fn root(state: &SharedState) -> Result<Self, ModuleError> {
        let id = state.read(|host| Ok(host.tree.root()))?;
        Ok(Self::new(state.clone(), id))
    }

    /// Arena id.
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Container name.
    pub fn name(&self) -> Result<String, ModuleError> {
        self.state
            .read(|host| Ok(host.tree.container(self.id)?.name().to_owned()))
    }

    /// Whether the container is enabled.
    pub fn is_enabled(&self) -> Result<bool, ModuleError> {
        self.state.read(|host| Ok(host.tree.container(self.id)?.is_enabled()))
    }

    /// Number of child containers.
    pub fn count_containers(&self) -> Result<usize, ModuleError> {
        self.state
            .read(|host| Ok(host.tree.container(self.id)?.container_ids().len()))
    }

    /// Child container by position.
    pub fn container(&self, index: usize) -> Result<ContainerRef, ModuleError> {
        let id = self.state.read(|host| {
            let ids = host.tree.container(self.id)?.container_ids();
            ModuleError::check_index("container", index, ids.len())?;
            Ok(ids[index])
        })?;
        Ok(Self::new(self.state.clone(), id))
    }

    /// Append a child container.
    pub fn create_container(&self, name: &str) -> Result<ContainerRef, ModuleError> {
        let id = self.state.write(|host| {
            let id = host.tree.add_container(self.id, name)?;
            host.output
                .control(MessageType::ConfigurationControlContainerCreate, name);
            Ok(id)
        })?;
        Ok(Self::new(self.state.clone(), id))
    }

    /// Remove the `index`-th child container. Fails without effect when
    /// the child still holds configurations or containers.
    pub fn remove_container(&self, index: usize) -> Result<(), ModuleError> {
        self.state.write(|host| {
            let removed = host.tree.remove_container(self.id, index)?;
            host.output
                .control(MessageType::ConfigurationControlContainerRemove, removed.name());
            Ok(())
        })
    }

    /// Number of configurations held directly.
    pub fn count_configurations(&self) -> Result<usize, ModuleError> {
        self.state
            .read(|host| Ok(host.tree.container(self.id)?.configuration_ids().len()))
    }

    /// Configuration by position.
    pub fn configuration(&self, index: usize) -> Result<ConfigurationRef, ModuleError> {
        let id = self.state.read(|host| {
            let ids = host.tree.container(self.id)?.configuration_ids();
            ModuleError::check_index("configuration", index, ids.len())?;
            Ok(ids[index])
        })?;
        Ok(ConfigurationRef::new(self.state.clone(), id))
    }
}
