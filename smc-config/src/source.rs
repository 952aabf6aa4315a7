//! Sources, source lists and how they resolve to messages.

use crate::tree::ConfigTree;
use serde::{Deserialize, Serialize};
use smc_api::{
    Action, ActionType, ConfigurationId, ExecutionContextId, Message, MessageType, ModuleError,
    SourceFilter, Value, filter_actions,
};

/// Kind of a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Output of every execution context of a configuration.
    ModuleConfiguration,
    /// Output of one execution context.
    ExecutionContext,
    /// A constant.
    StaticValue,
    /// Ordered group of nested sources.
    Multipart,
    /// Whatever the caller passed in.
    Caller,
    /// One named part of the caller's input.
    CallerRelativeName,
    /// A structured constant, one message per array item.
    ObjectArray,
}

impl SourceType {
    /// Fixed parameter count of this kind.
    pub const fn count_params(self) -> usize {
        match self {
            Self::ModuleConfiguration | Self::ExecutionContext => 4,
            Self::ObjectArray => 2,
            Self::StaticValue | Self::CallerRelativeName => 1,
            Self::Multipart | Self::Caller => 0,
        }
    }
}

/// How much of a referenced execution context's output to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceGetType {
    /// Everything produced since the last read.
    #[default]
    New,
    /// Only the last `count_last` actions.
    Last,
}

/// What a source reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    /// A constant.
    StaticValue {
        /// The value.
        value: Value,
    },
    /// Every execution context of a configuration.
    Configuration {
        /// Referenced configuration.
        configuration: ConfigurationId,
        /// Fetch policy.
        get_type: SourceGetType,
        /// Window for [`SourceGetType::Last`].
        count_last: usize,
        /// Wake the reader when new data arrives.
        event_driven: bool,
    },
    /// One execution context.
    ExecutionContext {
        /// Referenced execution context.
        execution_context: ExecutionContextId,
        /// Fetch policy.
        get_type: SourceGetType,
        /// Window for [`SourceGetType::Last`].
        count_last: usize,
        /// Wake the reader when new data arrives.
        event_driven: bool,
    },
    /// A structured constant decomposed per array item.
    ObjectArray {
        /// The value, normally an object array.
        value: Value,
        /// Dot paths each item is projected to. Empty keeps everything.
        fields: Vec<String>,
    },
    /// Nested sources, resolved in order and concatenated.
    Multipart {
        /// The nested list.
        sources: SourceList,
    },
    /// The caller's whole input.
    Caller,
    /// One named part of the caller's input.
    CallerRelativeName {
        /// Part name.
        name: String,
    },
}

impl SourceKind {
    /// Kind tag.
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::StaticValue { .. } => SourceType::StaticValue,
            Self::Configuration { .. } => SourceType::ModuleConfiguration,
            Self::ExecutionContext { .. } => SourceType::ExecutionContext,
            Self::ObjectArray { .. } => SourceType::ObjectArray,
            Self::Multipart { .. } => SourceType::Multipart,
            Self::Caller => SourceType::Caller,
            Self::CallerRelativeName { .. } => SourceType::CallerRelativeName,
        }
    }
}

/// One positional parameter of a source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceParam {
    /// A plain value.
    Value(Value),
    /// A configuration reference.
    Configuration(ConfigurationId),
    /// An execution context reference.
    ExecutionContext(ExecutionContextId),
    /// A fetch policy.
    GetType(SourceGetType),
}

/// An input channel of an execution context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    kind: SourceKind,
    order: usize,
    filters: Vec<SourceFilter>,
}

impl Source {
    /// What the source reads from.
    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    /// Kind tag.
    pub fn source_type(&self) -> SourceType {
        self.kind.source_type()
    }

    /// Stable order stamped when the source was created.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Fixed parameter count.
    pub fn count_params(&self) -> usize {
        self.source_type().count_params()
    }

    /// Parameter by position.
    pub fn param(&self, id: usize) -> Result<SourceParam, ModuleError> {
        ModuleError::check_index("source param", id, self.count_params())?;
        let policy = |get_type: SourceGetType, count_last: usize, event_driven: bool| match id {
            1 => SourceParam::GetType(get_type),
            2 => SourceParam::Value(Value::from(count_last)),
            _ => SourceParam::Value(Value::Boolean(event_driven)),
        };
        Ok(match &self.kind {
            SourceKind::StaticValue { value } => SourceParam::Value(value.clone()),
            SourceKind::Configuration {
                configuration,
                get_type,
                count_last,
                event_driven,
            } => match id {
                0 => SourceParam::Configuration(*configuration),
                _ => policy(*get_type, *count_last, *event_driven),
            },
            SourceKind::ExecutionContext {
                execution_context,
                get_type,
                count_last,
                event_driven,
            } => match id {
                0 => SourceParam::ExecutionContext(*execution_context),
                _ => policy(*get_type, *count_last, *event_driven),
            },
            SourceKind::ObjectArray { value, fields } => match id {
                0 => SourceParam::Value(value.clone()),
                _ => SourceParam::Value(Value::ObjectArray(
                    fields.iter().map(|f| Value::from(f.as_str())).collect(),
                )),
            },
            SourceKind::CallerRelativeName { name } => SourceParam::Value(Value::from(name.as_str())),
            SourceKind::Multipart { .. } | SourceKind::Caller => {
                return Err(ModuleError::invalid("source has no params"));
            }
        })
    }

    /// Filters in application order.
    pub fn filters(&self) -> &[SourceFilter] {
        &self.filters
    }

    /// Number of filters.
    pub fn count_filters(&self) -> usize {
        self.filters.len()
    }

    /// Filter by position.
    pub fn filter(&self, id: usize) -> Result<&SourceFilter, ModuleError> {
        ModuleError::check_index("filter", id, self.filters.len())?;
        Ok(&self.filters[id])
    }

    pub(crate) fn filters_mut(&mut self) -> &mut Vec<SourceFilter> {
        &mut self.filters
    }

    /// Resolve to messages, then apply the filters in order.
    pub fn resolve(&self, tree: &ConfigTree, data: &dyn SourceData) -> Vec<Message> {
        let messages = match &self.kind {
            SourceKind::StaticValue { value } => vec![Message::data(value.clone())],
            SourceKind::ObjectArray { value, fields } => match value {
                Value::ObjectArray(array) => array
                    .iter()
                    .map(|item| Message::data(project(item, fields)))
                    .collect(),
                other => vec![Message::data(project(other, fields))],
            },
            SourceKind::ExecutionContext {
                execution_context,
                get_type,
                count_last,
                ..
            } => data_messages(fetch(
                data.execution_context_actions(*execution_context),
                *get_type,
                *count_last,
            )),
            SourceKind::Configuration {
                configuration,
                get_type,
                count_last,
                ..
            } => tree
                .configuration(*configuration)
                .map(|node| node.execution_context_ids().to_vec())
                .unwrap_or_default()
                .into_iter()
                .flat_map(|ec| {
                    data_messages(fetch(data.execution_context_actions(ec), *get_type, *count_last))
                })
                .collect(),
            SourceKind::Multipart { sources } => sources.resolve(tree, data).into_iter().flatten().collect(),
            SourceKind::Caller => data_messages(data.caller_actions()),
            SourceKind::CallerRelativeName { name } => data_messages(data.caller_relative_actions(name)),
        };
        self.filters
            .iter()
            .fold(messages, |messages, filter| filter.apply(messages))
    }
}

fn project(value: &Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        value.clone()
    } else {
        value.project(fields)
    }
}

fn fetch(actions: Vec<Action>, get_type: SourceGetType, count_last: usize) -> Vec<Action> {
    match get_type {
        SourceGetType::New => actions,
        SourceGetType::Last => {
            let skip = actions.len().saturating_sub(count_last);
            actions.into_iter().skip(skip).collect()
        }
    }
}

fn data_messages(actions: Vec<Action>) -> Vec<Message> {
    filter_actions(&actions, Some(ActionType::Execute), Some(MessageType::Data))
        .into_iter()
        .flat_map(Action::into_messages)
        .collect()
}

/// Where resolved sources get runtime data from.
pub trait SourceData {
    /// Actions currently buffered for an execution context.
    fn execution_context_actions(&self, id: ExecutionContextId) -> Vec<Action>;

    /// The caller's whole input.
    fn caller_actions(&self) -> Vec<Action> {
        Vec::new()
    }

    /// One named part of the caller's input.
    fn caller_relative_actions(&self, _name: &str) -> Vec<Action> {
        Vec::new()
    }
}

/// No runtime data: only constant sources resolve to anything.
impl SourceData for () {
    fn execution_context_actions(&self, _id: ExecutionContextId) -> Vec<Action> {
        Vec::new()
    }
}

/// Ordered sources of one execution context or multipart source.
///
/// Each source gets the next value of a per-list counter as its order, so
/// removing a source never renumbers the others.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceList {
    sources: Vec<Source>,
    next_order: usize,
}

impl SourceList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source by position.
    pub fn get(&self, index: usize) -> Result<&Source, ModuleError> {
        ModuleError::check_index("source", index, self.sources.len())?;
        Ok(&self.sources[index])
    }

    /// Iterate in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut Source, ModuleError> {
        ModuleError::check_index("source", index, self.sources.len())?;
        Ok(&mut self.sources[index])
    }

    pub(crate) fn push(&mut self, kind: SourceKind) -> &Source {
        let order = self.next_order;
        self.next_order += 1;
        let index = self.sources.len();
        self.sources.push(Source {
            kind,
            order,
            filters: Vec::new(),
        });
        &self.sources[index]
    }

    /// Replace in place. The new source inherits the position's order and
    /// starts without filters.
    pub(crate) fn replace(&mut self, index: usize, kind: SourceKind) -> Result<&Source, ModuleError> {
        let slot = self.get_mut(index)?;
        slot.kind = kind;
        slot.filters.clear();
        Ok(slot)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Result<Source, ModuleError> {
        ModuleError::check_index("source", index, self.sources.len())?;
        Ok(self.sources.remove(index))
    }

    pub(crate) fn multipart_mut(&mut self, index: usize) -> Result<&mut SourceList, ModuleError> {
        match &mut self.get_mut(index)?.kind {
            SourceKind::Multipart { sources } => Ok(sources),
            _ => Err(ModuleError::invalid(format!("source {index} is not multipart"))),
        }
    }

    pub(crate) fn multipart(&self, index: usize) -> Result<&SourceList, ModuleError> {
        match &self.get(index)?.kind {
            SourceKind::Multipart { sources } => Ok(sources),
            _ => Err(ModuleError::invalid(format!("source {index} is not multipart"))),
        }
    }

    /// Resolve every source; one message list per source, in order.
    pub fn resolve(&self, tree: &ConfigTree, data: &dyn SourceData) -> Vec<Vec<Message>> {
        self.sources.iter().map(|s| s.resolve(tree, data)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smc_api::{ObjectArray, ObjectElement};

    struct Fixed(Vec<Action>);

    impl SourceData for Fixed {
        fn execution_context_actions(&self, _id: ExecutionContextId) -> Vec<Action> {
            self.0.clone()
        }

        fn caller_relative_actions(&self, name: &str) -> Vec<Action> {
            if name == "0" { self.0.clone() } else { Vec::new() }
        }
    }

    fn values(messages: &[Message]) -> Vec<Value> {
        messages.iter().map(|m| m.value().clone()).collect()
    }

    #[test]
    fn orders_survive_removal() {
        let mut list = SourceList::new();
        for v in 0..3 {
            list.push(SourceKind::StaticValue { value: Value::from(v) });
        }
        let removed = list.remove(1).unwrap();
        assert_eq!(removed.order(), 1);
        assert_eq!(list.get(1).unwrap().order(), 2);
        assert_eq!(list.push(SourceKind::Caller).order(), 3);
        assert!(list.remove(7).unwrap_err().is_invalid_argument());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn replace_keeps_order_and_drops_filters() {
        let mut list = SourceList::new();
        list.push(SourceKind::Caller);
        list.get_mut(0).unwrap().filters_mut().push(SourceFilter::number(0.0, 1.0, None));
        let replaced = list
            .replace(0, SourceKind::StaticValue { value: Value::from(1) })
            .unwrap();
        assert_eq!(replaced.order(), 0);
        assert_eq!(replaced.count_filters(), 0);
    }

    #[test]
    fn params_follow_arity() {
        let mut list = SourceList::new();
        let source = list.push(SourceKind::ExecutionContext {
            execution_context: ExecutionContextId::new(0, 1),
            get_type: SourceGetType::Last,
            count_last: 2,
            event_driven: true,
        });
        assert_eq!(source.count_params(), 4);
        assert_eq!(source.param(1).unwrap(), SourceParam::GetType(SourceGetType::Last));
        assert_eq!(source.param(2).unwrap(), SourceParam::Value(Value::Long(2)));
        assert_eq!(source.param(3).unwrap(), SourceParam::Value(Value::Boolean(true)));
        assert!(source.param(4).is_err());
    }

    #[test]
    fn last_policy_keeps_tail() {
        let tree = ConfigTree::new("root");
        let data = Fixed(vec![Action::data([1]), Action::data([2]), Action::data([3, 4])]);
        let mut list = SourceList::new();
        list.push(SourceKind::ExecutionContext {
            execution_context: ExecutionContextId::new(0, 1),
            get_type: SourceGetType::Last,
            count_last: 2,
            event_driven: false,
        });
        let resolved = list.resolve(&tree, &data);
        assert_eq!(values(&resolved[0]), [Value::Long(2), Value::Long(3), Value::Long(4)]);
    }

    #[test]
    fn object_array_decomposes_and_projects() {
        let items: ObjectArray = (0..3)
            .map(|n| Value::from(ObjectElement::default().with_field("n", n).with_field("x", "y")))
            .collect();
        let mut list = SourceList::new();
        list.push(SourceKind::ObjectArray {
            value: Value::from(items),
            fields: vec!["n".into()],
        });
        let resolved = list.resolve(&ConfigTree::new("root"), &());
        assert_eq!(resolved[0].len(), 3);
        let first = resolved[0][0].value().as_object_element().unwrap();
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn multipart_concatenates_and_filters_apply() {
        let mut inner = SourceList::new();
        inner.push(SourceKind::StaticValue { value: Value::from(1) });
        inner.push(SourceKind::CallerRelativeName { name: "0".into() });
        let mut list = SourceList::new();
        list.push(SourceKind::Multipart { sources: inner });
        let data = Fixed(vec![Action::data([5, 9])]);

        let resolved = list.resolve(&ConfigTree::new("root"), &data);
        assert_eq!(values(&resolved[0]), [Value::Long(1), Value::Long(5), Value::Long(9)]);

        list.get_mut(0).unwrap().filters_mut().push(SourceFilter::number(2.0, 6.0, None));
        let resolved = list.resolve(&ConfigTree::new("root"), &data);
        assert_eq!(values(&resolved[0]), [Value::Long(5)]);
    }
}
