//! Source list handles.
//!
//! Every structural change emits exactly one control message whose payload
//! is `"<configName>.<execCtxName>.<order>"`, the order being that of the
//! created, replaced or removed source.

use crate::configuration::ConfigurationRef;
use crate::execution_context::ExecutionContextRef;
use crate::source::{Source, SourceData, SourceGetType, SourceKind, SourceList};
use crate::state::SharedState;
use crate::tree::ConfigTree;
use smc_api::{ConfigurationId, ExecutionContextId, Message, MessageType, ModuleError, SourceFilter, Value};

/// The source list of an execution context, or of a multipart source
/// nested inside it.
#[derive(Debug, Clone)]
pub struct SourceListRef {
    state: SharedState,
    execution_context: ExecutionContextId,
    nesting: Vec<usize>,
}

/// A node a source points at, checked before the source is stored.
#[derive(Clone, Copy)]
enum Reference {
    Configuration(ConfigurationId),
    ExecutionContext(ExecutionContextId),
}

impl Reference {
    fn of(kind: &SourceKind) -> Option<Self> {
        match kind {
            SourceKind::Configuration { configuration, .. } => Some(Self::Configuration(*configuration)),
            SourceKind::ExecutionContext {
                execution_context, ..
            } => Some(Self::ExecutionContext(*execution_context)),
            _ => None,
        }
    }

    fn check(self, tree: &ConfigTree) -> Result<(), ModuleError> {
        match self {
            Self::Configuration(id) => tree.configuration(id).map(|_| ()),
            Self::ExecutionContext(id) => tree.execution_context(id).map(|_| ()),
        }
    }
}

impl SourceListRef {
    /// A view of the list reached from `execution_context` through the
    /// multipart sources at `nesting`.
    pub fn new(state: SharedState, execution_context: ExecutionContextId, nesting: Vec<usize>) -> Self {
        Self {
            state,
            execution_context,
            nesting,
        }
    }

    /// Execution context that owns the list.
    pub fn execution_context(&self) -> ExecutionContextRef {
        ExecutionContextRef::new(self.state.clone(), self.execution_context)
    }

    fn read<R>(&self, f: impl FnOnce(&SourceList) -> Result<R, ModuleError>) -> Result<R, ModuleError> {
        self.state
            .read(|host| f(host.tree.source_list(self.execution_context, &self.nesting)?))
    }

    /// Run a change and report it with the order `f` returns.
    fn change<R>(
        &self,
        kind: MessageType,
        reference: Option<Reference>,
        f: impl FnOnce(&mut SourceList) -> Result<(usize, R), ModuleError>,
    ) -> Result<R, ModuleError> {
        self.state.write(|host| {
            if let Some(reference) = reference {
                reference.check(&host.tree)?;
            }
            let path = host.tree.execution_context_path(self.execution_context)?;
            let list = host.tree.source_list_mut(self.execution_context, &self.nesting)?;
            let (order, out) = f(list)?;
            host.output.control(kind, format!("{path}.{order}"));
            Ok(out)
        })
    }

    /// Number of sources.
    pub fn count_sources(&self) -> Result<usize, ModuleError> {
        self.read(|list| Ok(list.len()))
    }

    /// Source by position.
    pub fn source(&self, index: usize) -> Result<Source, ModuleError> {
        self.read(|list| list.get(index).cloned())
    }

    /// All sources.
    pub fn sources(&self) -> Result<Vec<Source>, ModuleError> {
        self.read(|list| Ok(list.iter().cloned().collect()))
    }

    /// Append a source of any kind.
    pub fn create_source_kind(&self, kind: SourceKind) -> Result<Source, ModuleError> {
        let reference = Reference::of(&kind);
        self.change(MessageType::ConfigurationControlSourceContextCreate, reference, |list| {
            let source = list.push(kind).clone();
            Ok((source.order(), source))
        })
    }

    /// Replace the source at `index`, keeping its order.
    pub fn update_source_kind(&self, index: usize, kind: SourceKind) -> Result<Source, ModuleError> {
        let reference = Reference::of(&kind);
        self.change(MessageType::ConfigurationControlSourceContextUpdate, reference, |list| {
            let source = list.replace(index, kind)?.clone();
            Ok((source.order(), source))
        })
    }

    /// Remove the source at `index`. Out of range fails with no effect.
    pub fn remove_source(&self, index: usize) -> Result<Source, ModuleError> {
        self.change(MessageType::ConfigurationControlSourceContextRemove, None, |list| {
            let removed = list.remove(index)?;
            Ok((removed.order(), removed))
        })
    }

    /// Append a constant.
    pub fn create_source_value(&self, value: impl Into<Value>) -> Result<Source, ModuleError> {
        self.create_source_kind(SourceKind::StaticValue { value: value.into() })
    }

    /// Append a reference to every execution context of `configuration`.
    pub fn create_source_configuration(
        &self,
        configuration: &ConfigurationRef,
        get_type: SourceGetType,
        count_last: usize,
        event_driven: bool,
    ) -> Result<Source, ModuleError> {
        self.create_source_kind(SourceKind::Configuration {
            configuration: configuration.id(),
            get_type,
            count_last,
            event_driven,
        })
    }

    /// Append a reference to one execution context.
    pub fn create_source_execution_context(
        &self,
        execution_context: &ExecutionContextRef,
        get_type: SourceGetType,
        count_last: usize,
        event_driven: bool,
    ) -> Result<Source, ModuleError> {
        self.create_source_kind(SourceKind::ExecutionContext {
            execution_context: execution_context.id(),
            get_type,
            count_last,
            event_driven,
        })
    }

    /// Append a structured constant, projected to `fields` when non-empty.
    pub fn create_source_object_array(
        &self,
        value: impl Into<Value>,
        fields: Vec<String>,
    ) -> Result<Source, ModuleError> {
        self.create_source_kind(SourceKind::ObjectArray {
            value: value.into(),
            fields,
        })
    }

    /// Append an empty multipart source; fill it through [`Self::source_list`].
    pub fn create_source(&self) -> Result<Source, ModuleError> {
        self.create_source_kind(SourceKind::Multipart {
            sources: SourceList::new(),
        })
    }

    /// Append the caller's whole input.
    pub fn create_source_caller(&self) -> Result<Source, ModuleError> {
        self.create_source_kind(SourceKind::Caller)
    }

    /// Append one named part of the caller's input.
    pub fn create_source_caller_relative_name(&self, name: &str) -> Result<Source, ModuleError> {
        self.create_source_kind(SourceKind::CallerRelativeName {
            name: name.to_owned(),
        })
    }

    /// Replace with a constant.
    pub fn update_source_value(&self, index: usize, value: impl Into<Value>) -> Result<Source, ModuleError> {
        self.update_source_kind(index, SourceKind::StaticValue { value: value.into() })
    }

    /// Replace with a configuration reference.
    pub fn update_source_configuration(
        &self,
        index: usize,
        configuration: &ConfigurationRef,
        get_type: SourceGetType,
        count_last: usize,
        event_driven: bool,
    ) -> Result<Source, ModuleError> {
        self.update_source_kind(
            index,
            SourceKind::Configuration {
                configuration: configuration.id(),
                get_type,
                count_last,
                event_driven,
            },
        )
    }

    /// Replace with an execution context reference.
    pub fn update_source_execution_context(
        &self,
        index: usize,
        execution_context: &ExecutionContextRef,
        get_type: SourceGetType,
        count_last: usize,
        event_driven: bool,
    ) -> Result<Source, ModuleError> {
        self.update_source_kind(
            index,
            SourceKind::ExecutionContext {
                execution_context: execution_context.id(),
                get_type,
                count_last,
                event_driven,
            },
        )
    }

    /// Replace with a structured constant.
    pub fn update_source_object_array(
        &self,
        index: usize,
        value: impl Into<Value>,
        fields: Vec<String>,
    ) -> Result<Source, ModuleError> {
        self.update_source_kind(
            index,
            SourceKind::ObjectArray {
                value: value.into(),
                fields,
            },
        )
    }

    /// Replace with an empty multipart source.
    pub fn update_source(&self, index: usize) -> Result<Source, ModuleError> {
        self.update_source_kind(
            index,
            SourceKind::Multipart {
                sources: SourceList::new(),
            },
        )
    }

    /// Replace with the caller's whole input.
    pub fn update_source_caller(&self, index: usize) -> Result<Source, ModuleError> {
        self.update_source_kind(index, SourceKind::Caller)
    }

    /// Replace with one named part of the caller's input.
    pub fn update_source_caller_relative_name(&self, index: usize, name: &str) -> Result<Source, ModuleError> {
        self.update_source_kind(
            index,
            SourceKind::CallerRelativeName {
                name: name.to_owned(),
            },
        )
    }

    /// The nested list of the multipart source at `index`.
    pub fn source_list(&self, index: usize) -> Result<SourceListRef, ModuleError> {
        self.read(|list| list.multipart(index).map(|_| ()))?;
        let mut nesting = self.nesting.clone();
        nesting.push(index);
        Ok(Self::new(self.state.clone(), self.execution_context, nesting))
    }

    /// Attach a filter to the source at `source`.
    pub fn create_filter(&self, source: usize, filter: SourceFilter) -> Result<(), ModuleError> {
        self.change(MessageType::ConfigurationControlSourceContextUpdate, None, |list| {
            let source = list.get_mut(source)?;
            source.filters_mut().push(filter);
            Ok((source.order(), ()))
        })
    }

    /// Replace a filter of the source at `source`.
    pub fn update_filter(&self, source: usize, index: usize, filter: SourceFilter) -> Result<(), ModuleError> {
        self.change(MessageType::ConfigurationControlSourceContextUpdate, None, |list| {
            let source = list.get_mut(source)?;
            ModuleError::check_index("filter", index, source.count_filters())?;
            source.filters_mut()[index] = filter;
            Ok((source.order(), ()))
        })
    }

    /// Remove a filter of the source at `source`.
    pub fn remove_filter(&self, source: usize, index: usize) -> Result<(), ModuleError> {
        self.change(MessageType::ConfigurationControlSourceContextUpdate, None, |list| {
            let source = list.get_mut(source)?;
            ModuleError::check_index("filter", index, source.count_filters())?;
            source.filters_mut().remove(index);
            Ok((source.order(), ()))
        })
    }

    /// Resolve every source against `data`.
    pub fn resolve(&self, data: &dyn SourceData) -> Result<Vec<Vec<Message>>, ModuleError> {
        self.state.read(|host| {
            let list = host.tree.source_list(self.execution_context, &self.nesting)?;
            Ok(list.resolve(&host.tree, data))
        })
    }
}
