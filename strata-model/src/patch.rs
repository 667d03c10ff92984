use crate::{EntityError, EntityResult, Fields, FrozenValue, deep_freeze};
use serde_json::Value;

/// A write request against an entity.
///
/// `Reset` discards the overlay. `Set` assigns a partial set of fields; its
/// values are frozen when the patch is built, so merging never copies them.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Reset,
    Set(Fields),
}

impl Patch {
    /// Builds a `Set` patch. Values that are already frozen are kept as-is.
    pub fn set<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<FrozenValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Patch::Set(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// A `Set` patch with no fields. Merging it is a no-op.
    pub fn empty() -> Self {
        Patch::Set(Fields::new())
    }

    /// Adds or replaces one assignment. A `Reset` patch becomes a `Set`.
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<FrozenValue>) -> Self {
        let mut fields = match self {
            Patch::Reset => Fields::new(),
            Patch::Set(fields) => fields,
        };
        fields.insert(key.into(), value.into());
        Patch::Set(fields)
    }

    /// Parses the JSON form: `null` is a reset, an object is a set of
    /// assignments. Anything else is rejected.
    pub fn from_json(value: Value) -> EntityResult<Self> {
        match value {
            Value::Null => Ok(Patch::Reset),
            Value::Object(map) => Ok(Patch::Set(
                map.into_iter()
                    .map(|(key, value)| (key, deep_freeze(value)))
                    .collect(),
            )),
            other => Err(EntityError::InvalidPatch(format!(
                "expected an object or null, got {}",
                deep_freeze(other).kind()
            ))),
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, Patch::Reset)
    }

    /// Assigned keys; empty for a reset.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let fields = match self {
            Patch::Reset => None,
            Patch::Set(fields) => Some(fields),
        };
        fields.into_iter().flat_map(|f| f.keys().map(String::as_str))
    }

    /// Keeps only assignments whose key is in `allowed`. A reset passes through.
    #[must_use]
    pub fn project(self, allowed: &[String]) -> Self {
        match self {
            Patch::Reset => Patch::Reset,
            Patch::Set(mut fields) => {
                fields.retain(|key, _| allowed.iter().any(|a| a == key));
                Patch::Set(fields)
            }
        }
    }
}

impl TryFrom<Value> for Patch {
    type Error = EntityError;

    fn try_from(value: Value) -> EntityResult<Self> {
        Patch::from_json(value)
    }
}
