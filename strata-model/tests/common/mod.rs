//! Shared fixtures for entity model tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{Value, json};
use strata_model::{
    Class, Dispatch, Entity, EntityResult, FieldDef, Patch, Shape, make_entity, merge,
};

/// Routes `tracing` output to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shape of the `counter` test entity: `{ count: number, tag: text | null }`.
pub fn counter_shape() -> Shape {
    Shape::new(
        "counter",
        vec![FieldDef::number("count"), FieldDef::text("tag").nullable()],
    )
}

/// `Counter(count = 0, tag = null)`.
pub fn counter_class() -> Class {
    Class::new(counter_shape(), |args: &[Value]| {
        json!({
            "count": args.first().cloned().unwrap_or(json!(0)),
            "tag": args.get(1).cloned().unwrap_or(Value::Null),
        })
    })
}

pub fn make_counter(args: &[Value]) -> Entity {
    make_entity(&counter_class(), args).unwrap()
}

/// Minimal dispatch target: runs `merge` against a held entity and records
/// what it was sent.
pub struct RecordingTarget {
    pub current: Mutex<Entity>,
    pub received: Mutex<Vec<Option<Patch>>>,
}

impl RecordingTarget {
    pub fn new(entity: &Entity) -> Self {
        Self {
            current: Mutex::new(entity.clone()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Entity {
        self.current.lock().clone()
    }

    pub fn received(&self) -> Vec<Option<Patch>> {
        self.received.lock().clone()
    }

    pub fn dispatch_patch(&self, patch: Patch) {
        self.dispatch(Some(patch)).unwrap();
    }
}

impl Dispatch for RecordingTarget {
    fn dispatch(&self, patch: Option<Patch>) -> EntityResult<()> {
        self.received.lock().push(patch.clone());
        let mut current = self.current.lock();
        let next = merge(&current, patch.as_ref())?;
        *current = next;
        Ok(())
    }
}
