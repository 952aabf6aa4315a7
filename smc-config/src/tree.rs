//! The arena holding every container, configuration and execution context.
//!
//! Nodes live in `slab` arenas and are addressed by generational ids, so
//! a handle to a removed node fails cleanly instead of reaching whatever
//! reused its slot. Parent/child links are id lists; the tree never holds
//! references into itself.

use crate::source::SourceList;
use slab::Slab;
use smc_api::{
    ConfigurationId, ContainerId, ExecutionContextId, ModuleDescriptor, ModuleError, Value,
    WorkInterval,
};
use std::collections::BTreeMap;

/// A grouping node. Holds child containers and configurations.
#[derive(Debug, Clone)]
pub struct ContainerNode {
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) containers: Vec<ContainerId>,
    pub(crate) configurations: Vec<ConfigurationId>,
}

impl ContainerNode {
    /// Container name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the container is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Child containers in order.
    pub fn container_ids(&self) -> &[ContainerId] {
        &self.containers
    }

    /// Child configurations in order.
    pub fn configuration_ids(&self) -> &[ConfigurationId] {
        &self.configurations
    }
}

/// A configured instance of a module.
#[derive(Debug, Clone)]
pub struct ConfigurationNode {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) module: ModuleDescriptor,
    pub(crate) container: Option<ContainerId>,
    pub(crate) settings: BTreeMap<String, Value>,
    pub(crate) variables: BTreeMap<String, Value>,
    pub(crate) buffer_size: usize,
    pub(crate) thread_buffer_size: usize,
    pub(crate) enabled: bool,
    pub(crate) execution_contexts: Vec<ExecutionContextId>,
}

impl ConfigurationNode {
    /// Configuration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Module this configuration instantiates.
    pub fn module(&self) -> &ModuleDescriptor {
        &self.module
    }

    /// Owning container, if attached.
    pub fn container(&self) -> Option<ContainerId> {
        self.container
    }

    /// Settings by key.
    pub fn settings(&self) -> &BTreeMap<String, Value> {
        &self.settings
    }

    /// Variables by key.
    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    /// Output buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Per-thread buffer size.
    pub fn thread_buffer_size(&self) -> usize {
        self.thread_buffer_size
    }

    /// Whether the configuration is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Owned execution contexts in order.
    pub fn execution_context_ids(&self) -> &[ExecutionContextId] {
        &self.execution_contexts
    }
}

/// A runnable unit of a configuration, with its sources.
#[derive(Debug, Clone)]
pub struct ExecutionContextNode {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) max_work_interval: WorkInterval,
    pub(crate) enabled: bool,
    pub(crate) configuration: ConfigurationId,
    pub(crate) execution_contexts: Vec<ExecutionContextId>,
    pub(crate) managed_configurations: Vec<ConfigurationId>,
    pub(crate) sources: SourceList,
}

impl ExecutionContextNode {
    /// Execution context name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution context type, `"default"` unless set.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Work-interval bound.
    pub fn max_work_interval(&self) -> WorkInterval {
        self.max_work_interval
    }

    /// Whether the context is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Owning configuration.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Nested execution contexts in order.
    pub fn execution_context_ids(&self) -> &[ExecutionContextId] {
        &self.execution_contexts
    }

    /// Managed configurations in order.
    pub fn managed_configuration_ids(&self) -> &[ConfigurationId] {
        &self.managed_configurations
    }

    /// Sources.
    pub fn sources(&self) -> &SourceList {
        &self.sources
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u64,
    node: T,
}

/// The configuration tree of one runtime instance.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    containers: Slab<Slot<ContainerNode>>,
    configurations: Slab<Slot<ConfigurationNode>>,
    execution_contexts: Slab<Slot<ExecutionContextNode>>,
    root: ContainerId,
    last_generation: u64,
}

fn lookup<'a, T>(slab: &'a Slab<Slot<T>>, index: usize, generation: u64, what: &str) -> Result<&'a T, ModuleError> {
    slab.get(index)
        .filter(|slot| slot.generation == generation)
        .map(|slot| &slot.node)
        .ok_or_else(|| ModuleError::invalid(format!("unknown or removed {what}")))
}

fn lookup_mut<'a, T>(
    slab: &'a mut Slab<Slot<T>>,
    index: usize,
    generation: u64,
    what: &str,
) -> Result<&'a mut T, ModuleError> {
    slab.get_mut(index)
        .filter(|slot| slot.generation == generation)
        .map(|slot| &mut slot.node)
        .ok_or_else(|| ModuleError::invalid(format!("unknown or removed {what}")))
}

impl ConfigTree {
    /// Create a tree holding only a root container.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut containers = Slab::new();
        let index = containers.insert(Slot {
            generation: 1,
            node: ContainerNode {
                name: root_name.into(),
                enabled: true,
                containers: Vec::new(),
                configurations: Vec::new(),
            },
        });
        Self {
            containers,
            configurations: Slab::new(),
            execution_contexts: Slab::new(),
            root: ContainerId::new(index, 1),
            last_generation: 1,
        }
    }

    fn stamp(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }

    /// The root container.
    pub fn root(&self) -> ContainerId {
        self.root
    }

    /// Container by id.
    pub fn container(&self, id: ContainerId) -> Result<&ContainerNode, ModuleError> {
        lookup(&self.containers, id.index(), id.generation(), "container")
    }

    pub(crate) fn container_mut(&mut self, id: ContainerId) -> Result<&mut ContainerNode, ModuleError> {
        lookup_mut(&mut self.containers, id.index(), id.generation(), "container")
    }

    /// Configuration by id.
    pub fn configuration(&self, id: ConfigurationId) -> Result<&ConfigurationNode, ModuleError> {
        lookup(&self.configurations, id.index(), id.generation(), "configuration")
    }

    pub(crate) fn configuration_mut(
        &mut self,
        id: ConfigurationId,
    ) -> Result<&mut ConfigurationNode, ModuleError> {
        lookup_mut(&mut self.configurations, id.index(), id.generation(), "configuration")
    }

    /// Execution context by id.
    pub fn execution_context(&self, id: ExecutionContextId) -> Result<&ExecutionContextNode, ModuleError> {
        lookup(&self.execution_contexts, id.index(), id.generation(), "execution context")
    }

    pub(crate) fn execution_context_mut(
        &mut self,
        id: ExecutionContextId,
    ) -> Result<&mut ExecutionContextNode, ModuleError> {
        lookup_mut(&mut self.execution_contexts, id.index(), id.generation(), "execution context")
    }

    /// Append a child container.
    pub fn add_container(&mut self, parent: ContainerId, name: impl Into<String>) -> Result<ContainerId, ModuleError> {
        self.container(parent)?;
        let generation = self.stamp();
        let index = self.containers.insert(Slot {
            generation,
            node: ContainerNode {
                name: name.into(),
                enabled: true,
                containers: Vec::new(),
                configurations: Vec::new(),
            },
        });
        let id = ContainerId::new(index, generation);
        self.container_mut(parent)?.containers.push(id);
        Ok(id)
    }

    /// Remove the `index`-th child of `parent`. Refused while the child
    /// still holds configurations or containers.
    pub fn remove_container(&mut self, parent: ContainerId, index: usize) -> Result<ContainerNode, ModuleError> {
        let p = self.container(parent)?;
        ModuleError::check_index("container", index, p.containers.len())?;
        let child = p.containers[index];
        let node = self.container(child)?;
        if !node.configurations.is_empty() {
            return Err(ModuleError::Conflict("container has child configurations".into()));
        }
        if !node.containers.is_empty() {
            return Err(ModuleError::Conflict("container has child containers".into()));
        }
        self.container_mut(parent)?.containers.remove(index);
        tracing::debug!(container = %child, "container removed");
        Ok(self.containers.remove(child.index()).node)
    }

    /// Insert a configuration, appended to `container` when given.
    pub fn add_configuration(
        &mut self,
        container: Option<ContainerId>,
        module: ModuleDescriptor,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<ConfigurationId, ModuleError> {
        if let Some(container) = container {
            self.container(container)?;
        }
        let generation = self.stamp();
        let index = self.configurations.insert(Slot {
            generation,
            node: ConfigurationNode {
                name: name.into(),
                description,
                module,
                container,
                settings: BTreeMap::new(),
                variables: BTreeMap::new(),
                buffer_size: 0,
                thread_buffer_size: 1,
                enabled: true,
                execution_contexts: Vec::new(),
            },
        });
        let id = ConfigurationId::new(index, generation);
        if let Some(container) = container {
            self.container_mut(container)?.configurations.push(id);
        }
        Ok(id)
    }

    /// Move a configuration: it leaves its old container's sequence before
    /// it is appended to the new one.
    pub fn set_configuration_container(
        &mut self,
        id: ConfigurationId,
        container: Option<ContainerId>,
    ) -> Result<(), ModuleError> {
        if let Some(target) = container {
            self.container(target)?;
        }
        let old = self.configuration(id)?.container;
        self.detach_configuration(id, old);
        if let Some(target) = container {
            self.container_mut(target)?.configurations.push(id);
        }
        self.configuration_mut(id)?.container = container;
        Ok(())
    }

    fn detach_configuration(&mut self, id: ConfigurationId, container: Option<ContainerId>) {
        if let Some(node) = container.and_then(|c| self.container_mut(c).ok()) {
            node.configurations.retain(|c| *c != id);
        }
    }

    /// Remove a configuration with its execution contexts, and drop it from
    /// every managed-configuration list.
    pub fn remove_configuration(&mut self, id: ConfigurationId) -> Result<ConfigurationNode, ModuleError> {
        let node = self.configuration(id)?;
        let container = node.container;
        let owned = node.execution_contexts.clone();
        self.detach_configuration(id, container);
        for ec in owned {
            self.free_execution_context(ec);
        }
        for (_, slot) in self.execution_contexts.iter_mut() {
            slot.node.managed_configurations.retain(|c| *c != id);
        }
        tracing::debug!(configuration = %id, "configuration removed");
        Ok(self.configurations.remove(id.index()).node)
    }

    /// Append an execution context to a configuration.
    pub fn add_execution_context(
        &mut self,
        configuration: ConfigurationId,
        name: impl Into<String>,
        kind: Option<String>,
        max_work_interval: WorkInterval,
    ) -> Result<ExecutionContextId, ModuleError> {
        self.configuration(configuration)?;
        let generation = self.stamp();
        let index = self.execution_contexts.insert(Slot {
            generation,
            node: ExecutionContextNode {
                name: name.into(),
                kind: kind.unwrap_or_else(|| "default".to_owned()),
                max_work_interval,
                enabled: true,
                configuration,
                execution_contexts: Vec::new(),
                managed_configurations: Vec::new(),
                sources: SourceList::new(),
            },
        });
        let id = ExecutionContextId::new(index, generation);
        self.configuration_mut(configuration)?.execution_contexts.push(id);
        Ok(id)
    }

    /// Remove the `index`-th execution context of a configuration.
    pub fn remove_execution_context(
        &mut self,
        configuration: ConfigurationId,
        index: usize,
    ) -> Result<ExecutionContextNode, ModuleError> {
        let node = self.configuration(configuration)?;
        ModuleError::check_index("execution context", index, node.execution_contexts.len())?;
        let id = self.configuration_mut(configuration)?.execution_contexts.remove(index);
        self.free_execution_context(id)
            .ok_or_else(|| ModuleError::invalid("unknown or removed execution context"))
    }

    fn free_execution_context(&mut self, id: ExecutionContextId) -> Option<ExecutionContextNode> {
        self.execution_context(id).ok()?;
        for (_, slot) in self.execution_contexts.iter_mut() {
            slot.node.execution_contexts.retain(|ec| *ec != id);
        }
        tracing::debug!(execution_context = %id, "execution context removed");
        Some(self.execution_contexts.remove(id.index()).node)
    }

    /// `"<configName>.<execCtxName>"`, the payload of execution-context and
    /// source control messages.
    pub fn execution_context_path(&self, id: ExecutionContextId) -> Result<String, ModuleError> {
        let ec = self.execution_context(id)?;
        let cfg = self.configuration(ec.configuration)?;
        Ok(format!("{}.{}", cfg.name, ec.name))
    }

    /// The source list of an execution context, descending into multipart
    /// sources along `nesting`.
    pub fn source_list(&self, id: ExecutionContextId, nesting: &[usize]) -> Result<&SourceList, ModuleError> {
        let mut list = &self.execution_context(id)?.sources;
        for &index in nesting {
            list = list.multipart(index)?;
        }
        Ok(list)
    }

    pub(crate) fn source_list_mut(
        &mut self,
        id: ExecutionContextId,
        nesting: &[usize],
    ) -> Result<&mut SourceList, ModuleError> {
        let mut list = &mut self.execution_context_mut(id)?.sources;
        for &index in nesting {
            list = list.multipart_mut(index)?;
        }
        Ok(list)
    }

    /// Number of live configurations.
    pub fn count_configurations(&self) -> usize {
        self.configurations.len()
    }

    /// Number of live execution contexts.
    pub fn count_execution_contexts(&self) -> usize {
        self.execution_contexts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_configuration() -> (ConfigTree, ConfigurationId) {
        let mut tree = ConfigTree::new("root");
        let root = tree.root();
        let cfg = tree
            .add_configuration(Some(root), ModuleDescriptor::new("Module"), "cfg", None)
            .unwrap();
        (tree, cfg)
    }

    #[test]
    fn stale_handles_are_rejected() {
        let (mut tree, cfg) = tree_with_configuration();
        tree.remove_configuration(cfg).unwrap();
        let again = tree
            .add_configuration(None, ModuleDescriptor::new("Module"), "other", None)
            .unwrap();
        assert_eq!(again.index(), cfg.index());
        assert!(tree.configuration(cfg).unwrap_err().is_invalid_argument());
        assert_eq!(tree.configuration(again).unwrap().name(), "other");
    }

    #[test]
    fn container_removal_conflicts() {
        let (mut tree, _) = tree_with_configuration();
        let root = tree.root();
        let child = tree.add_container(root, "child").unwrap();
        tree.add_container(child, "grandchild").unwrap();

        let err = tree.remove_container(root, 0).unwrap_err();
        assert!(matches!(err, ModuleError::Conflict(ref m) if m.contains("child containers")));
        tree.remove_container(child, 0).unwrap();
        tree.remove_container(root, 0).unwrap();
        assert!(tree.remove_container(root, 0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn configurations_block_container_removal() {
        let mut tree = ConfigTree::new("root");
        let root = tree.root();
        let child = tree.add_container(root, "child").unwrap();
        tree.add_configuration(Some(child), ModuleDescriptor::new("Module"), "cfg", None)
            .unwrap();
        let err = tree.remove_container(root, 0).unwrap_err();
        assert!(matches!(err, ModuleError::Conflict(ref m) if m.contains("child configurations")));
    }

    #[test]
    fn reparenting_moves_between_sequences() {
        let (mut tree, cfg) = tree_with_configuration();
        let root = tree.root();
        let other = tree.add_container(root, "other").unwrap();
        tree.set_configuration_container(cfg, Some(other)).unwrap();
        assert!(tree.container(root).unwrap().configuration_ids().is_empty());
        assert_eq!(tree.container(other).unwrap().configuration_ids(), [cfg]);
        assert_eq!(tree.configuration(cfg).unwrap().container(), Some(other));
    }

    #[test]
    fn removing_execution_context_purges_nested_links() {
        let (mut tree, cfg) = tree_with_configuration();
        let outer = tree
            .add_execution_context(cfg, "outer", None, WorkInterval::Unbounded)
            .unwrap();
        let inner = tree
            .add_execution_context(cfg, "inner", None, WorkInterval::Unbounded)
            .unwrap();
        tree.execution_context_mut(outer).unwrap().execution_contexts.push(inner);

        let removed = tree.remove_execution_context(cfg, 1).unwrap();
        assert_eq!(removed.name(), "inner");
        assert!(tree.execution_context(outer).unwrap().execution_context_ids().is_empty());
        assert_eq!(tree.execution_context_path(outer).unwrap(), "cfg.outer");
    }

    #[test]
    fn defaults() {
        let (mut tree, cfg) = tree_with_configuration();
        let node = tree.configuration(cfg).unwrap();
        assert_eq!(node.buffer_size(), 0);
        assert_eq!(node.thread_buffer_size(), 1);
        let ec = tree
            .add_execution_context(cfg, "ec", None, WorkInterval::Unbounded)
            .unwrap();
        assert_eq!(tree.execution_context(ec).unwrap().kind(), "default");
    }
}
