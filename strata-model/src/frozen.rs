//! Deeply immutable JSON-like values.
//!
//! A [`FrozenValue`] has no mutating API at any depth. Lists and records keep
//! their children behind `Arc`, so cloning a value or carrying it into a new
//! overlay shares the existing subtree instead of copying it.

use crate::EntityError;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An immutable value stored in a baseline, an overlay, or a patch.
#[derive(Debug, Clone, PartialEq)]
pub enum FrozenValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(Arc<str>),
    List(Arc<[FrozenValue]>),
    Record(Arc<BTreeMap<String, FrozenValue>>),
}

/// Freezes a mutable JSON tree.
///
/// Depth-first: every nested array and object is frozen before its parent is
/// built, so no parent ever holds a mutable child. The input is consumed;
/// there is no handle left through which the frozen tree could be changed.
pub fn deep_freeze(value: Value) -> FrozenValue {
    match value {
        Value::Null => FrozenValue::Null,
        Value::Bool(b) => FrozenValue::Bool(b),
        Value::Number(n) => FrozenValue::Number(n),
        Value::String(s) => FrozenValue::Text(s.into()),
        Value::Array(items) => {
            let children: Vec<FrozenValue> = items.into_iter().map(deep_freeze).collect();
            FrozenValue::List(children.into())
        }
        Value::Object(entries) => {
            let children: BTreeMap<String, FrozenValue> = entries
                .into_iter()
                .map(|(key, child)| (key, deep_freeze(child)))
                .collect();
            FrozenValue::Record(Arc::new(children))
        }
    }
}

impl FrozenValue {
    /// Returns an owned, mutable JSON copy. Changes to the copy are never
    /// visible through `self`.
    pub fn thaw(&self) -> Value {
        match self {
            FrozenValue::Null => Value::Null,
            FrozenValue::Bool(b) => Value::Bool(*b),
            FrozenValue::Number(n) => Value::Number(n.clone()),
            FrozenValue::Text(s) => Value::String(s.to_string()),
            FrozenValue::List(items) => Value::Array(items.iter().map(Self::thaw).collect()),
            FrozenValue::Record(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(key, child)| (key.clone(), child.thaw()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// True when both values point at the same allocation, i.e. one is a
    /// shared copy of the other rather than an equal rebuild.
    ///
    /// Scalars have no allocation to share and always return `false`.
    pub fn shares_with(&self, other: &FrozenValue) -> bool {
        match (self, other) {
            (FrozenValue::Text(a), FrozenValue::Text(b)) => Arc::ptr_eq(a, b),
            (FrozenValue::List(a), FrozenValue::List(b)) => Arc::ptr_eq(a, b),
            (FrozenValue::Record(a), FrozenValue::Record(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Short name of the value's kind, matching [`FieldType`](crate::FieldType) names.
    pub fn kind(&self) -> &'static str {
        match self {
            FrozenValue::Null => "null",
            FrozenValue::Bool(_) => "bool",
            FrozenValue::Number(_) => "number",
            FrozenValue::Text(_) => "text",
            FrozenValue::List(_) => "list",
            FrozenValue::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FrozenValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrozenValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FrozenValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FrozenValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FrozenValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FrozenValue]> {
        match self {
            FrozenValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, FrozenValue>> {
        match self {
            FrozenValue::Record(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a key when this value is a record.
    pub fn get(&self, key: &str) -> Option<&FrozenValue> {
        self.as_record().and_then(|entries| entries.get(key))
    }
}

impl From<Value> for FrozenValue {
    fn from(value: Value) -> Self {
        deep_freeze(value)
    }
}

impl From<&str> for FrozenValue {
    fn from(value: &str) -> Self {
        FrozenValue::Text(value.into())
    }
}

impl From<String> for FrozenValue {
    fn from(value: String) -> Self {
        FrozenValue::Text(value.into())
    }
}

impl From<bool> for FrozenValue {
    fn from(value: bool) -> Self {
        FrozenValue::Bool(value)
    }
}

impl From<i64> for FrozenValue {
    fn from(value: i64) -> Self {
        FrozenValue::Number(value.into())
    }
}

/// Fails for NaN and infinities, which have no JSON number form.
impl TryFrom<f64> for FrozenValue {
    type Error = EntityError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value)
            .map(FrozenValue::Number)
            .ok_or_else(|| EntityError::InvalidPatch(format!("{value} is not a finite number")))
    }
}

impl PartialEq<Value> for FrozenValue {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (FrozenValue::Null, Value::Null) => true,
            (FrozenValue::Bool(a), Value::Bool(b)) => a == b,
            (FrozenValue::Number(a), Value::Number(b)) => a == b,
            (FrozenValue::Text(a), Value::String(b)) => &**a == b.as_str(),
            (FrozenValue::List(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (FrozenValue::Record(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, x)| b.get(key).is_some_and(|y| x == y))
            }
            _ => false,
        }
    }
}
