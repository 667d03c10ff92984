use crate::{EntityId, FrozenValue, Shape};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Field name → frozen value.
pub type Fields = BTreeMap<String, FrozenValue>;

/// The committed state of one generation.
///
/// Holds exactly one value per field of its shape. A baseline is never
/// modified; a commit replaces it with a new one.
#[derive(Debug, PartialEq)]
pub struct Baseline {
    shape: Arc<Shape>,
    generation: u64,
    fields: Fields,
}

impl Baseline {
    pub(crate) fn new(shape: Arc<Shape>, generation: u64, fields: Fields) -> Arc<Self> {
        Arc::new(Self {
            shape,
            generation,
            fields,
        })
    }

    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// 0 for a freshly made entity, incremented by every commit.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, name: &str) -> Option<&FrozenValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Thawed JSON copy of the baseline.
    pub fn to_value(&self) -> Value {
        fields_to_value(&self.fields)
    }
}

/// The value handed to readers: an overlay of uncommitted field changes on
/// top of a baseline.
///
/// `Entity` is a cheap handle. Clones refer to the same overlay, which is
/// what [`Entity::ptr_eq`] compares. Reading a field that is not overridden
/// falls through to the baseline.
///
/// The overlay never changes after construction. The baseline pointer is the
/// one exception: [`commit`](crate::commit) re-parents the committed handle
/// onto the new generation so callers holding it see the committed baseline.
/// Visible values are the same before and after the swap.
#[derive(Clone)]
pub struct Entity {
    inner: Arc<Layer>,
}

struct Layer {
    id: EntityId,
    baseline: RwLock<Arc<Baseline>>,
    overrides: Arc<Fields>,
}

impl Entity {
    pub(crate) fn from_parts(id: EntityId, baseline: Arc<Baseline>, overrides: Arc<Fields>) -> Self {
        Self {
            inner: Arc::new(Layer {
                id,
                baseline: RwLock::new(baseline),
                overrides,
            }),
        }
    }

    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    pub fn baseline(&self) -> Arc<Baseline> {
        self.inner.baseline.read().clone()
    }

    pub fn shape(&self) -> Arc<Shape> {
        Arc::clone(self.baseline().shape())
    }

    pub fn generation(&self) -> u64 {
        self.inner.baseline.read().generation()
    }

    /// Visible value of a field: the override if present, else the baseline's.
    pub fn get(&self, name: &str) -> Option<FrozenValue> {
        match self.inner.overrides.get(name) {
            Some(value) => Some(value.clone()),
            None => self.inner.baseline.read().get(name).cloned(),
        }
    }

    pub fn get_str(&self, name: &str) -> Option<Arc<str>> {
        match self.get(name)? {
            FrozenValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    /// Names of the fields changed since the last commit or reset.
    pub fn own_fields(&self) -> impl Iterator<Item = &str> {
        self.inner.overrides.keys().map(String::as_str)
    }

    pub fn own_field_count(&self) -> usize {
        self.inner.overrides.len()
    }

    pub fn has_override(&self, name: &str) -> bool {
        self.inner.overrides.contains_key(name)
    }

    pub fn overrides(&self) -> &Fields {
        &self.inner.overrides
    }

    /// Thawed JSON copy of the merged view.
    pub fn to_value(&self) -> Value {
        let baseline = self.baseline();
        let mut merged = baseline.fields().clone();
        merged.extend(
            self.inner
                .overrides
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        fields_to_value(&merged)
    }

    /// Same overlay, not merely equal values.
    pub fn ptr_eq(a: &Entity, b: &Entity) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Both entities currently sit on the same baseline allocation.
    pub fn same_generation(a: &Entity, b: &Entity) -> bool {
        Arc::ptr_eq(&a.baseline(), &b.baseline())
    }

    /// A fresh overlay with no overrides on the current baseline.
    pub fn reset(&self) -> Entity {
        self.with_overrides(Arc::new(Fields::new()))
    }

    pub(crate) fn with_overrides(&self, overrides: Arc<Fields>) -> Entity {
        Entity::from_parts(self.id(), self.baseline(), overrides)
    }

    pub(crate) fn reparent(&self, baseline: Arc<Baseline>) {
        *self.inner.baseline.write() = baseline;
    }
}

/// Structural equality: same entity type, equal baseline fields and equal
/// overrides. Ids and generations are not compared.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        if Entity::ptr_eq(self, other) {
            return true;
        }
        let (a, b) = (self.baseline(), other.baseline());
        a.shape().entity_type == b.shape().entity_type
            && a.fields() == b.fields()
            && self.overrides() == other.overrides()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let baseline = self.baseline();
        f.debug_struct("Entity")
            .field("id", &self.id())
            .field("entity_type", &baseline.shape().entity_type)
            .field("generation", &baseline.generation())
            .field("baseline", baseline.fields())
            .field("overrides", self.overrides())
            .finish()
    }
}

fn fields_to_value(fields: &Fields) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), value.thaw()))
        .collect();
    Value::Object(map)
}
