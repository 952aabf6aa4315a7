//! Runtime configuration, loadable from JSON.

use serde::{Deserialize, Serialize};
use smc_api::{ModuleDescriptor, ModuleError, WorkInterval};
use std::collections::BTreeMap;

/// A configuration the module manages from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedConfigurationConfig {
    /// Configuration name.
    pub name: String,
    /// Module name, looked up in the catalog.
    pub module: String,
}

/// Everything the runtime needs to build the host around a module.
///
/// Settings and variables are raw JSON; their kinds are inferred the same
/// way input values are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Root container name.
    pub container: String,
    /// Name of the module's own configuration.
    pub configuration: String,
    /// Description of the module's own configuration.
    pub description: Option<String>,
    /// Name of the module's own execution context.
    pub execution_context: String,
    /// Type of the module's own execution context.
    pub execution_context_type: String,
    /// Work-interval bound of the module's own execution context.
    pub max_work_interval: WorkInterval,
    /// Buffer size of the module's own configuration.
    pub buffer_size: usize,
    /// Thread buffer size of the module's own configuration.
    pub thread_buffer_size: usize,
    /// Initial settings.
    pub settings: BTreeMap<String, serde_json::Value>,
    /// Initial variables.
    pub variables: BTreeMap<String, serde_json::Value>,
    /// Extra modules offered to the configuration controller.
    pub modules: Vec<ModuleDescriptor>,
    /// Configurations managed from the start.
    pub managed_configurations: Vec<ManagedConfigurationConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            container: "root".to_owned(),
            configuration: "default".to_owned(),
            description: None,
            execution_context: "default".to_owned(),
            execution_context_type: "default".to_owned(),
            max_work_interval: WorkInterval::Unbounded,
            buffer_size: 0,
            thread_buffer_size: 1,
            settings: BTreeMap::new(),
            variables: BTreeMap::new(),
            modules: Vec::new(),
            managed_configurations: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ModuleError> {
        Ok(serde_json::from_str(json)?)
    }
}
