//! Entity construction.

use crate::entity::{Baseline, Entity, Fields};
use crate::{EntityError, EntityId, EntityResult, Shape, deep_freeze};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds the initial instance of an entity type.
///
/// The equivalent of a class constructor: `construct` receives the initial
/// arguments and returns a JSON object holding every field of `shape()`.
pub trait EntityFactory {
    fn shape(&self) -> Arc<Shape>;

    fn construct(&self, args: &[Value]) -> Value;
}

type Constructor = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A shape paired with a constructor function.
pub struct Class {
    shape: Arc<Shape>,
    constructor: Box<Constructor>,
}

impl Class {
    pub fn new<F>(shape: Shape, constructor: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            shape: Arc::new(shape),
            constructor: Box::new(constructor),
        }
    }
}

impl EntityFactory for Class {
    fn shape(&self) -> Arc<Shape> {
        Arc::clone(&self.shape)
    }

    fn construct(&self, args: &[Value]) -> Value {
        (self.constructor)(args)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class").field("shape", &self.shape).finish_non_exhaustive()
    }
}

/// Constructs generation 0 of a new entity.
///
/// `factory.construct` runs exactly once. Its output must be an object
/// carrying every declared field with a value of the declared type; a
/// missing nullable field defaults to `null`. Keys outside the shape are
/// dropped. The result is deep-frozen as the baseline and returned behind an
/// empty overlay.
pub fn make_entity<F>(factory: &F, initial_args: &[Value]) -> EntityResult<Entity>
where
    F: EntityFactory + ?Sized,
{
    let shape = factory.shape();
    let mut instance = match factory.construct(initial_args) {
        Value::Object(map) => map,
        other => {
            return Err(EntityError::ShapeMismatch(format!(
                "`{}` constructor returned {}, expected an object",
                shape.entity_type,
                deep_freeze(other).kind()
            )));
        }
    };

    let mut fields = Fields::new();
    for def in &shape.fields {
        if fields.contains_key(&def.name) {
            continue;
        }
        let value = match instance.remove(&def.name) {
            Some(value) => deep_freeze(value),
            None if def.nullable => deep_freeze(Value::Null),
            None => {
                return Err(EntityError::ShapeMismatch(format!(
                    "`{}` constructor did not set field `{}`",
                    shape.entity_type, def.name
                )));
            }
        };
        def.check(&value)?;
        fields.insert(def.name.clone(), value);
    }
    if !instance.is_empty() {
        let dropped: Vec<&String> = instance.keys().collect();
        debug!(entity_type = %shape.entity_type, ?dropped, "constructor set undeclared fields");
    }

    let id = EntityId::mint();
    debug!(entity_id = %id, entity_type = %shape.entity_type, "entity created");
    let baseline = Baseline::new(shape, 0, fields);
    Ok(Entity::from_parts(id, baseline, Arc::new(Fields::new())))
}
