//! Structured payloads: named fields and ordered arrays.

use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};

/// One named field of an [`ObjectElement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    name: String,
    value: Value,
}

impl ObjectField {
    /// Create a field; the value's kind is inferred.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Kind of the field value.
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Take the value out.
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// An ordered set of named fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectElement {
    fields: Vec<ObjectField>,
}

impl ObjectElement {
    /// Create an element from fields, keeping their order.
    pub fn new(fields: Vec<ObjectField>) -> Self {
        Self { fields }
    }

    /// Builder-style append.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(ObjectField::new(name, value));
        self
    }

    /// All fields in order.
    pub fn fields(&self) -> &[ObjectField] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First field with the given name.
    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Follow a dot path (`"a.b.c"`) through nested elements.
    pub fn path(&self, path: &str) -> Option<&Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.field(head)?.value();
        match rest {
            None => Some(value),
            Some(rest) => value.as_object_element()?.path(rest),
        }
    }

    /// Keep only the fields named by the dot paths. A path naming a field
    /// keeps it whole; a longer path keeps the matching part of a nested
    /// element or array.
    pub fn project<S: AsRef<str>>(&self, paths: &[S]) -> Self {
        let fields = self
            .fields
            .iter()
            .filter_map(|field| {
                let mut nested = Vec::new();
                for path in paths {
                    let path = path.as_ref();
                    if path == field.name {
                        return Some(field.clone());
                    }
                    if let Some(rest) = path
                        .strip_prefix(field.name.as_str())
                        .and_then(|rest| rest.strip_prefix('.'))
                    {
                        nested.push(rest);
                    }
                }
                match &field.value {
                    _ if nested.is_empty() => None,
                    Value::ObjectElement(_) | Value::ObjectArray(_) => {
                        Some(ObjectField::new(field.name.clone(), field.value.project(&nested)))
                    }
                    _ => None,
                }
            })
            .collect();
        Self { fields }
    }
}

/// An ordered collection of values, usually elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectArray {
    items: Vec<Value>,
}

impl ObjectArray {
    /// Create an array, keeping item order.
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    /// All items in order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Iterate items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Take the items out.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Project every element item to the dot paths.
    pub fn project<S: AsRef<str>>(&self, paths: &[S]) -> Self {
        self.items.iter().map(|item| item.project(paths)).collect()
    }
}

impl FromIterator<Value> for ObjectArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ObjectArray {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> ObjectElement {
        ObjectElement::default()
            .with_field("name", "ada")
            .with_field("age", 36)
            .with_field(
                "address",
                ObjectElement::default()
                    .with_field("city", "london")
                    .with_field("zip", "N1"),
            )
    }

    #[test]
    fn path_walks_nested_elements() {
        let p = person();
        assert_eq!(p.path("address.city"), Some(&Value::from("london")));
        assert_eq!(p.path("address.country"), None);
        assert_eq!(p.path("name.first"), None);
    }

    #[test]
    fn projection_keeps_requested_paths_in_order() {
        let projected = person().project(&["address.zip", "name"]);
        let names: Vec<_> = projected.fields().iter().map(ObjectField::name).collect();
        assert_eq!(names, ["name", "address"]);
        let address = projected.path("address").unwrap().as_object_element().unwrap();
        assert_eq!(address.len(), 1);
        assert_eq!(address.path("zip"), Some(&Value::from("N1")));
    }

    #[test]
    fn array_projection_leaves_scalars() {
        let array: ObjectArray = vec![Value::from(person()), Value::Long(1)].into_iter().collect();
        let projected = array.project(&["age"]);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected.get(1), Some(&Value::Long(1)));
        let first = projected.get(0).unwrap().as_object_element().unwrap();
        assert_eq!(first.len(), 1);
    }
}
