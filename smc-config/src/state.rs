//! Host state shared by every handle of one runtime instance.

use crate::tree::ConfigTree;
use smc_api::{ModuleError, OutputLog};
use std::sync::{Arc, Mutex};

/// The configuration tree and the output log, mutated together so a
/// structural change and its control message land atomically.
#[derive(Debug)]
pub struct HostState {
    /// Containers, configurations, execution contexts.
    pub tree: ConfigTree,
    /// Everything emitted so far.
    pub output: OutputLog,
}

/// Cheaply clonable reference to one [`HostState`].
///
/// Locks are held only for the duration of a closure and never across an
/// await point. The lock is not reentrant: closures must not call back into
/// handles that share this state.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<Mutex<HostState>>,
}

impl SharedState {
    /// Fresh state with a root container named `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self::from_tree(ConfigTree::new(root_name))
    }

    /// Wrap an existing tree with an empty log.
    pub fn from_tree(tree: ConfigTree) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HostState {
                tree,
                output: OutputLog::new(),
            })),
        }
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&HostState) -> Result<R, ModuleError>) -> Result<R, ModuleError> {
        let state = self
            .inner
            .lock()
            .map_err(|e| ModuleError::Other(e.to_string().into()))?;
        f(&state)
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut HostState) -> Result<R, ModuleError>) -> Result<R, ModuleError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|e| ModuleError::Other(e.to_string().into()))?;
        f(&mut state)
    }

    /// True when both handles point at the same state.
    pub fn same_as(&self, other: &SharedState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
