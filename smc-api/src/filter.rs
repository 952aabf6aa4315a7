//! Filters that narrow the messages a source resolves to.
//!
//! Each filter kind has a fixed parameter arity. Filters can be built from
//! typed constructors or from a raw parameter list the way a host hands
//! them over; the raw form is validated for arity and parameter kinds.

use crate::error::ModuleError;
use crate::message::Message;
use crate::object::ObjectArray;
use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};

/// Filter kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceFilterType {
    /// Periodic window over positions.
    Position,
    /// Numeric range.
    Number,
    /// String equality.
    StringEqual,
    /// Substring match.
    StringContain,
    /// Projection to object paths.
    ObjectPaths,
}

impl SourceFilterType {
    /// Fixed parameter count of this kind.
    pub const fn count_params(self) -> usize {
        match self {
            Self::Position => 5,
            Self::Number | Self::StringEqual | Self::StringContain => 3,
            Self::ObjectPaths => 1,
        }
    }
}

/// A filter attached to a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceFilter {
    /// Select positions whose offset inside each period falls in one of the
    /// half-open `ranges`, starting at `start_offset`, for `count_periods`
    /// periods (0 = no limit). `period` 0 means a single unbounded period.
    /// With `for_object` the window runs over the items of object arrays
    /// instead of over messages.
    Position {
        /// Half-open offset ranges inside a period. Empty selects all.
        ranges: Vec<(usize, usize)>,
        /// Period length.
        period: usize,
        /// Number of periods to apply.
        count_periods: usize,
        /// Positions before this are dropped.
        start_offset: usize,
        /// Apply to array items instead of messages.
        for_object: bool,
    },
    /// Keep numbers in `min..=max`.
    Number {
        /// Lower bound, inclusive.
        min: f64,
        /// Upper bound, inclusive.
        max: f64,
        /// Dot path of the compared field; `None` compares the value itself.
        field: Option<String>,
    },
    /// Keep (or drop, when `need_equals` is false) strings equal to `value`.
    StringEqual {
        /// Keep matches when true, drop them when false.
        need_equals: bool,
        /// Compared text.
        value: String,
        /// Dot path of the compared field.
        field: Option<String>,
    },
    /// Keep (or drop) strings containing `value`.
    StringContain {
        /// Keep matches when true, drop them when false.
        need_contain: bool,
        /// Searched text.
        value: String,
        /// Dot path of the compared field.
        field: Option<String>,
    },
    /// Project structured values to the given dot paths.
    ObjectPaths {
        /// Dot paths to keep.
        paths: Vec<String>,
    },
}

impl SourceFilter {
    /// Periodic position window.
    pub fn position(
        ranges: Vec<(usize, usize)>,
        period: usize,
        count_periods: usize,
        start_offset: usize,
        for_object: bool,
    ) -> Self {
        Self::Position {
            ranges,
            period,
            count_periods,
            start_offset,
            for_object,
        }
    }

    /// Numeric range.
    pub fn number(min: f64, max: f64, field: Option<&str>) -> Self {
        Self::Number {
            min,
            max,
            field: field.map(str::to_owned),
        }
    }

    /// String equality.
    pub fn string_equal(need_equals: bool, value: impl Into<String>, field: Option<&str>) -> Self {
        Self::StringEqual {
            need_equals,
            value: value.into(),
            field: field.map(str::to_owned),
        }
    }

    /// Substring match.
    pub fn string_contain(
        need_contain: bool,
        value: impl Into<String>,
        field: Option<&str>,
    ) -> Self {
        Self::StringContain {
            need_contain,
            value: value.into(),
            field: field.map(str::to_owned),
        }
    }

    /// Projection.
    pub fn object_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ObjectPaths {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a filter from raw parameters.
    ///
    /// Position: `[ranges: ObjectArray of Long pairs flattened, period,
    /// countPeriods, startOffset, forObject: Boolean]`. Number: `[min, max,
    /// fieldName]`. StringEqual / StringContain: `[need: Boolean, value,
    /// fieldName]`. ObjectPaths: `[paths: ObjectArray of String]`. An empty
    /// field name means the value itself.
    pub fn from_params(filter_type: SourceFilterType, params: Vec<Value>) -> Result<Self, ModuleError> {
        let expected = filter_type.count_params();
        if params.len() != expected {
            return Err(ModuleError::invalid(format!(
                "{filter_type:?} filter takes {expected} params, got {}",
                params.len()
            )));
        }
        let p = &params;
        Ok(match filter_type {
            SourceFilterType::Position => {
                let flat = p[0]
                    .as_object_array()
                    .ok_or_else(|| kind_error(0, ValueType::ObjectArray, &p[0]))?
                    .iter()
                    .enumerate()
                    .map(|(i, v)| non_negative(i, v))
                    .collect::<Result<Vec<_>, _>>()?;
                if flat.len() % 2 != 0 {
                    return Err(ModuleError::invalid("position ranges must come in pairs"));
                }
                Self::Position {
                    ranges: flat.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect(),
                    period: non_negative(1, &p[1])?,
                    count_periods: non_negative(2, &p[2])?,
                    start_offset: non_negative(3, &p[3])?,
                    for_object: p[4].as_bool().ok_or_else(|| kind_error(4, ValueType::Boolean, &p[4]))?,
                }
            }
            SourceFilterType::Number => Self::Number {
                min: p[0].as_f64().ok_or_else(|| kind_error(0, ValueType::Double, &p[0]))?,
                max: p[1].as_f64().ok_or_else(|| kind_error(1, ValueType::Double, &p[1]))?,
                field: field_param(2, &p[2])?,
            },
            SourceFilterType::StringEqual => Self::StringEqual {
                need_equals: p[0].as_bool().ok_or_else(|| kind_error(0, ValueType::Boolean, &p[0]))?,
                value: string_param(1, &p[1])?,
                field: field_param(2, &p[2])?,
            },
            SourceFilterType::StringContain => Self::StringContain {
                need_contain: p[0].as_bool().ok_or_else(|| kind_error(0, ValueType::Boolean, &p[0]))?,
                value: string_param(1, &p[1])?,
                field: field_param(2, &p[2])?,
            },
            SourceFilterType::ObjectPaths => Self::ObjectPaths {
                paths: p[0]
                    .as_object_array()
                    .ok_or_else(|| kind_error(0, ValueType::ObjectArray, &p[0]))?
                    .iter()
                    .map(|v| string_param(0, v))
                    .collect::<Result<_, _>>()?,
            },
        })
    }

    /// Kind of this filter.
    pub fn filter_type(&self) -> SourceFilterType {
        match self {
            Self::Position { .. } => SourceFilterType::Position,
            Self::Number { .. } => SourceFilterType::Number,
            Self::StringEqual { .. } => SourceFilterType::StringEqual,
            Self::StringContain { .. } => SourceFilterType::StringContain,
            Self::ObjectPaths { .. } => SourceFilterType::ObjectPaths,
        }
    }

    /// Fixed parameter count.
    pub fn count_params(&self) -> usize {
        self.filter_type().count_params()
    }

    /// Raw parameter list, in the form [`SourceFilter::from_params`] accepts.
    pub fn params(&self) -> Vec<Value> {
        let field = |f: &Option<String>| Value::from(f.clone().unwrap_or_default());
        match self {
            Self::Position {
                ranges,
                period,
                count_periods,
                start_offset,
                for_object,
            } => vec![
                Value::ObjectArray(
                    ranges
                        .iter()
                        .flat_map(|&(start, end)| [Value::from(start), Value::from(end)])
                        .collect(),
                ),
                Value::from(*period),
                Value::from(*count_periods),
                Value::from(*start_offset),
                Value::Boolean(*for_object),
            ],
            Self::Number { min, max, field: f } => {
                vec![Value::Double(*min), Value::Double(*max), field(f)]
            }
            Self::StringEqual {
                need_equals: need,
                value,
                field: f,
            }
            | Self::StringContain {
                need_contain: need,
                value,
                field: f,
            } => vec![Value::Boolean(*need), Value::from(value.as_str()), field(f)],
            Self::ObjectPaths { paths } => vec![Value::ObjectArray(
                paths.iter().map(|p| Value::from(p.as_str())).collect(),
            )],
        }
    }

    /// One raw parameter.
    pub fn param(&self, id: usize) -> Result<Value, ModuleError> {
        ModuleError::check_index("filter param", id, self.count_params())?;
        Ok(self.params().swap_remove(id))
    }

    /// Narrow `messages`. Never reorders.
    pub fn apply(&self, messages: Vec<Message>) -> Vec<Message> {
        match self {
            Self::Position {
                for_object: false, ..
            } => messages
                .into_iter()
                .enumerate()
                .filter(|(i, _)| self.selects_position(*i))
                .map(|(_, m)| m)
                .collect(),
            Self::Position {
                for_object: true, ..
            } => messages
                .into_iter()
                .map(|m| {
                    m.map_value(|value| match value {
                        Value::ObjectArray(array) => Value::ObjectArray(
                            array
                                .into_items()
                                .into_iter()
                                .enumerate()
                                .filter(|(i, _)| self.selects_position(*i))
                                .map(|(_, item)| item)
                                .collect(),
                        ),
                        other => other,
                    })
                })
                .collect(),
            Self::ObjectPaths { paths } => messages
                .into_iter()
                .map(|m| m.map_value(|value| value.project(paths)))
                .collect(),
            Self::Number { field, .. }
            | Self::StringEqual { field, .. }
            | Self::StringContain { field, .. } => messages
                .into_iter()
                .filter_map(|m| match (m.value(), field) {
                    (Value::ObjectArray(array), Some(_)) => {
                        let kept: ObjectArray =
                            array.iter().filter(|item| self.matches(item)).cloned().collect();
                        (!kept.is_empty()).then(|| m.map_value(|_| Value::ObjectArray(kept)))
                    }
                    (value, _) => self.matches(value).then_some(m),
                })
                .collect(),
        }
    }

    fn selects_position(&self, index: usize) -> bool {
        let Self::Position {
            ranges,
            period,
            count_periods,
            start_offset,
            ..
        } = self
        else {
            return true;
        };
        let Some(relative) = index.checked_sub(*start_offset) else {
            return false;
        };
        let (cycle, offset) = match *period {
            0 => (0, relative),
            p => (relative / p, relative % p),
        };
        if *count_periods > 0 && cycle >= *count_periods {
            return false;
        }
        ranges.is_empty() || ranges.iter().any(|&(start, end)| offset >= start && offset < end)
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Number { min, max, field } => target(value, field)
                .and_then(Value::as_f64)
                .is_some_and(|n| n >= *min && n <= *max),
            Self::StringEqual {
                need_equals,
                value: expected,
                field,
            } => target(value, field)
                .and_then(Value::as_str)
                .is_some_and(|s| (s == expected.as_str()) == *need_equals),
            Self::StringContain {
                need_contain,
                value: needle,
                field,
            } => target(value, field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.contains(needle.as_str()) == *need_contain),
            Self::Position { .. } | Self::ObjectPaths { .. } => true,
        }
    }
}

fn target<'a>(value: &'a Value, field: &Option<String>) -> Option<&'a Value> {
    match field {
        None => Some(value),
        Some(path) => value.as_object_element()?.path(path),
    }
}

fn kind_error(index: usize, expected: ValueType, got: &Value) -> ModuleError {
    ModuleError::invalid(format!(
        "filter param {index} must be {expected:?}, got {:?}",
        got.value_type()
    ))
}

fn non_negative(index: usize, value: &Value) -> Result<usize, ModuleError> {
    value
        .as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ModuleError::invalid(format!("filter param {index} must be a non-negative Long, got {value}")))
}

fn string_param(index: usize, value: &Value) -> Result<String, ModuleError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| kind_error(index, ValueType::String, value))
}

fn field_param(index: usize, value: &Value) -> Result<Option<String>, ModuleError> {
    string_param(index, value).map(|s| (!s.is_empty()).then_some(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectElement;

    fn data(values: &[i64]) -> Vec<Message> {
        values.iter().map(|v| Message::data(*v)).collect()
    }

    fn longs(messages: &[Message]) -> Vec<i64> {
        messages.iter().filter_map(|m| m.value().as_i64()).collect()
    }

    #[test]
    fn arity_is_fixed() {
        assert_eq!(SourceFilterType::Position.count_params(), 5);
        assert_eq!(SourceFilterType::Number.count_params(), 3);
        assert_eq!(SourceFilterType::ObjectPaths.count_params(), 1);
        let err = SourceFilter::from_params(SourceFilterType::Number, vec![Value::Long(1)]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn wrong_param_kind_rejected() {
        let err = SourceFilter::from_params(
            SourceFilterType::StringEqual,
            vec![Value::from("yes"), Value::from("a"), Value::from("")],
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn params_are_accepted_back() {
        let filter = SourceFilter::position(vec![(0, 2)], 5, 2, 1, false);
        let rebuilt = SourceFilter::from_params(SourceFilterType::Position, filter.params()).unwrap();
        assert_eq!(rebuilt, filter);
        assert_eq!(filter.param(1).unwrap(), Value::Long(5));
        assert!(filter.param(5).is_err());
    }

    #[test]
    fn position_window() {
        // offsets 0..2 of every period of 4, two periods, starting at 1
        let filter = SourceFilter::position(vec![(0, 2)], 4, 2, 1, false);
        let kept = filter.apply(data(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
        assert_eq!(longs(&kept), [1, 2, 5, 6]);
    }

    #[test]
    fn position_for_object_filters_items() {
        let array: ObjectArray = (0..5).map(Value::Long).collect();
        let filter = SourceFilter::position(vec![(1, 3)], 0, 0, 0, true);
        let kept = filter.apply(vec![Message::data(array), Message::data(9)]);
        assert_eq!(kept.len(), 2);
        let items = kept[0].value().as_object_array().unwrap();
        assert_eq!(items.items(), [Value::Long(1), Value::Long(2)]);
        assert_eq!(kept[1].value(), &Value::Long(9));
    }

    #[test]
    fn number_range() {
        let filter = SourceFilter::number(2.0, 4.0, None);
        assert_eq!(longs(&filter.apply(data(&[1, 2, 3, 4, 5]))), [2, 3, 4]);
    }

    #[test]
    fn string_filters_on_fields() {
        let element = |city: &str| Message::data(ObjectElement::default().with_field("city", city));
        let messages = vec![element("paris"), element("london"), element("lyon")];

        let equal = SourceFilter::string_equal(true, "london", Some("city"));
        assert_eq!(equal.apply(messages.clone()).len(), 1);

        let not_equal = SourceFilter::string_equal(false, "london", Some("city"));
        assert_eq!(not_equal.apply(messages.clone()).len(), 2);

        let contains = SourceFilter::string_contain(true, "ly", Some("city"));
        assert_eq!(contains.apply(messages).len(), 1);
    }

    #[test]
    fn field_filter_inside_arrays() {
        let array: ObjectArray = [1, 5, 9]
            .into_iter()
            .map(|n| Value::from(ObjectElement::default().with_field("n", n)))
            .collect();
        let filter = SourceFilter::number(4.0, 10.0, Some("n"));
        let kept = filter.apply(vec![Message::data(array)]);
        assert_eq!(kept[0].value().as_object_array().unwrap().len(), 2);

        let none = SourceFilter::number(100.0, 200.0, Some("n"));
        let array: ObjectArray = vec![Value::from(ObjectElement::default().with_field("n", 1))]
            .into_iter()
            .collect();
        assert!(none.apply(vec![Message::data(array)]).is_empty());
    }

    #[test]
    fn object_paths_project() {
        let element = ObjectElement::default().with_field("a", 1).with_field("b", 2);
        let filter = SourceFilter::object_paths(["b"]);
        let kept = filter.apply(vec![Message::data(element)]);
        let projected = kept[0].value().as_object_element().unwrap();
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.path("b"), Some(&Value::Long(2)));
    }
}
