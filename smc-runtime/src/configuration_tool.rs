//! The module's view of its own configuration.

use smc_api::{ModuleError, Value};
use smc_config::ConfigurationRef;
use std::collections::BTreeMap;

/// Wraps the module's configuration and tracks which variables came from
/// outside since startup.
///
/// Every variable present when the tool is created is flagged as changed.
/// Writing a variable through the tool clears its flag; removing it drops
/// the flag.
#[derive(Debug, Clone)]
pub struct ConfigurationTool {
    configuration: ConfigurationRef,
    changed: BTreeMap<String, bool>,
}

impl ConfigurationTool {
    /// Snapshot the variables of `configuration` as changed.
    pub fn new(configuration: ConfigurationRef) -> Result<Self, ModuleError> {
        let changed = configuration
            .variables()?
            .into_keys()
            .map(|key| (key, true))
            .collect();
        Ok(Self {
            configuration,
            changed,
        })
    }

    /// The configuration handle.
    pub fn configuration(&self) -> &ConfigurationRef {
        &self.configuration
    }

    /// Configuration name.
    pub fn name(&self) -> Result<String, ModuleError> {
        self.configuration.name()
    }

    /// Setting by key.
    pub fn setting(&self, key: &str) -> Result<Option<Value>, ModuleError> {
        self.configuration.setting(key)
    }

    /// Variable by key.
    pub fn variable(&self, key: &str) -> Result<Option<Value>, ModuleError> {
        self.configuration.variable(key)
    }

    /// Write a variable and mark it as set by the module.
    pub fn set_variable(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ModuleError> {
        self.configuration.set_variable(key, value)?;
        self.changed.insert(key.to_owned(), false);
        Ok(())
    }

    /// Remove a variable and its flag.
    pub fn remove_variable(&mut self, key: &str) -> Result<bool, ModuleError> {
        let removed = self.configuration.remove_variable(key)?;
        self.changed.remove(key);
        Ok(removed)
    }

    /// Whether a variable still holds the value it was given from outside.
    /// `None` for keys the tool never saw.
    pub fn is_variable_changed(&self, key: &str) -> Option<bool> {
        self.changed.get(key).copied()
    }

    /// All change flags.
    pub fn variable_change_flags(&self) -> &BTreeMap<String, bool> {
        &self.changed
    }

    fn label(&self) -> String {
        self.configuration.name().unwrap_or_default()
    }

    /// Log at trace level on behalf of the module.
    pub fn logger_trace(&self, text: &str) {
        tracing::trace!(configuration = %self.label(), "{text}");
    }

    /// Log at debug level on behalf of the module.
    pub fn logger_debug(&self, text: &str) {
        tracing::debug!(configuration = %self.label(), "{text}");
    }

    /// Log at info level on behalf of the module.
    pub fn logger_info(&self, text: &str) {
        tracing::info!(configuration = %self.label(), "{text}");
    }

    /// Log at warn level on behalf of the module.
    pub fn logger_warn(&self, text: &str) {
        tracing::warn!(configuration = %self.label(), "{text}");
    }

    /// Log at error level on behalf of the module.
    pub fn logger_error(&self, text: &str) {
        tracing::error!(configuration = %self.label(), "{text}");
    }
}
