//! Module catalog entries and their cardinality bounds.

use crate::error::ModuleError;
use serde::{Deserialize, Serialize};

/// One type a module can be instantiated as, with the bounds a
/// configuration of that type should respect. `None` maxima are unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleType {
    /// Type name.
    pub name: String,
    /// Minimum number of sources.
    pub min_count_sources: usize,
    /// Maximum number of sources.
    pub max_count_sources: Option<usize>,
    /// Minimum number of execution contexts.
    pub min_count_execution_contexts: usize,
    /// Maximum number of execution contexts.
    pub max_count_execution_contexts: Option<usize>,
    /// Minimum number of managed configurations.
    pub min_count_managed_configurations: usize,
    /// Maximum number of managed configurations.
    pub max_count_managed_configurations: Option<usize>,
}

impl ModuleType {
    /// An unconstrained type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for ModuleType {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            min_count_sources: 0,
            max_count_sources: None,
            min_count_execution_contexts: 0,
            max_count_execution_contexts: None,
            min_count_managed_configurations: 0,
            max_count_managed_configurations: None,
        }
    }
}

/// A module the host knows how to instantiate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    name: String,
    #[serde(default = "default_types")]
    types: Vec<ModuleType>,
}

fn default_types() -> Vec<ModuleType> {
    vec![ModuleType::default()]
}

impl ModuleDescriptor {
    /// A module with the single unconstrained type `"default"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: default_types(),
        }
    }

    /// A module with explicit types.
    pub fn with_types(name: impl Into<String>, types: Vec<ModuleType>) -> Self {
        Self {
            name: name.into(),
            types,
        }
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of types.
    pub fn count_types(&self) -> usize {
        self.types.len()
    }

    /// Type by id.
    pub fn module_type(&self, type_id: usize) -> Result<&ModuleType, ModuleError> {
        ModuleError::check_index("module type", type_id, self.types.len())?;
        Ok(&self.types[type_id])
    }

    /// Name of a type.
    pub fn type_name(&self, type_id: usize) -> Result<&str, ModuleError> {
        self.module_type(type_id).map(|t| t.name.as_str())
    }

    /// Check counts against a type's bounds. The host does not enforce
    /// these itself; callers run this before creating a configuration.
    pub fn validate(
        &self,
        type_id: usize,
        sources: usize,
        execution_contexts: usize,
        managed_configurations: usize,
    ) -> Result<(), ModuleError> {
        let t = self.module_type(type_id)?;
        check_bounds("sources", sources, t.min_count_sources, t.max_count_sources)?;
        check_bounds(
            "execution contexts",
            execution_contexts,
            t.min_count_execution_contexts,
            t.max_count_execution_contexts,
        )?;
        check_bounds(
            "managed configurations",
            managed_configurations,
            t.min_count_managed_configurations,
            t.max_count_managed_configurations,
        )
    }
}

fn check_bounds(what: &str, count: usize, min: usize, max: Option<usize>) -> Result<(), ModuleError> {
    if count < min || max.is_some_and(|max| count > max) {
        let max = max.map_or_else(|| "unbounded".to_owned(), |m| m.to_string());
        return Err(ModuleError::invalid(format!(
            "{count} {what} outside bounds {min}..={max}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_type_is_unbounded() {
        let module = ModuleDescriptor::new("Module");
        assert_eq!(module.count_types(), 1);
        assert_eq!(module.type_name(0).unwrap(), "default");
        assert!(module.type_name(1).unwrap_err().is_invalid_argument());
        assert!(module.validate(0, 1000, 1000, 1000).is_ok());
    }

    #[test]
    fn bounds_are_checked() {
        let module = ModuleDescriptor::with_types(
            "Reader",
            vec![ModuleType {
                min_count_sources: 1,
                max_count_sources: Some(2),
                ..ModuleType::new("reader")
            }],
        );
        assert!(module.validate(0, 0, 0, 0).is_err());
        assert!(module.validate(0, 2, 0, 0).is_ok());
        assert!(module.validate(0, 3, 0, 0).is_err());
    }

    #[test]
    fn catalog_loads_from_json() {
        let module: ModuleDescriptor = serde_json::from_str(r#"{"name": "Parser"}"#).unwrap();
        assert_eq!(module, ModuleDescriptor::new("Parser"));
    }
}
