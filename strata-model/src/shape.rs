use crate::{EntityError, EntityResult, FrozenValue};
use serde::{Deserialize, Serialize};

/// Declares an entity type's fields.
///
/// A shape is declared once and shared by every baseline and overlay of that
/// type. Patch keys are validated against it, never against a live instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub entity_type: String,
    pub fields: Vec<FieldDef>,
}

impl Shape {
    pub fn new(entity_type: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields,
        }
    }

    /// Looks up a declared field. With duplicate names the first one wins.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// One named, typed field of a [`Shape`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    /// Whether `null` is accepted in addition to `field_type`.
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDef {
    fn simple(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
        }
    }

    /// Shorthand for a field accepting any value.
    pub fn any(name: &str) -> Self {
        Self::simple(name, FieldType::Any)
    }

    /// Shorthand for a boolean field.
    pub fn bool(name: &str) -> Self {
        Self::simple(name, FieldType::Bool)
    }

    /// Shorthand for a numeric field.
    pub fn number(name: &str) -> Self {
        Self::simple(name, FieldType::Number)
    }

    /// Shorthand for a text field.
    pub fn text(name: &str) -> Self {
        Self::simple(name, FieldType::Text)
    }

    /// Shorthand for a list field.
    pub fn list(name: &str) -> Self {
        Self::simple(name, FieldType::List)
    }

    /// Shorthand for a nested record field.
    pub fn record(name: &str) -> Self {
        Self::simple(name, FieldType::Record)
    }

    /// Also accept `null`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn accepts(&self, value: &FrozenValue) -> bool {
        (self.nullable && value.is_null()) || self.field_type.accepts(value)
    }

    /// Errors with [`EntityError::FieldType`] if `value` does not fit this field.
    pub fn check(&self, value: &FrozenValue) -> EntityResult<()> {
        if self.accepts(value) {
            Ok(())
        } else {
            Err(EntityError::FieldType {
                field: self.name.clone(),
                expected: self.field_type.as_str(),
                found: value.kind(),
            })
        }
    }
}

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Any,
    Bool,
    Number,
    Text,
    List,
    Record,
}

impl FieldType {
    pub fn accepts(self, value: &FrozenValue) -> bool {
        matches!(
            (self, value),
            (FieldType::Any, _)
                | (FieldType::Bool, FrozenValue::Bool(_))
                | (FieldType::Number, FrozenValue::Number(_))
                | (FieldType::Text, FrozenValue::Text(_))
                | (FieldType::List, FrozenValue::List(_))
                | (FieldType::Record, FrozenValue::Record(_))
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Any => "any",
            FieldType::Bool => "bool",
            FieldType::Number => "number",
            FieldType::Text => "text",
            FieldType::List => "list",
            FieldType::Record => "record",
        }
    }
}
