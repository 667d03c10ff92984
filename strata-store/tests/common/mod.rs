//! Shared fixtures for store tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use strata_model::{Class, Entity, FieldDef, Shape};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `Counter(count = 0, tag = null)`.
pub fn counter_class() -> Class {
    let shape = Shape::new(
        "counter",
        vec![FieldDef::number("count"), FieldDef::text("tag").nullable()],
    );
    Class::new(shape, |args: &[Value]| {
        json!({
            "count": args.first().cloned().unwrap_or(json!(0)),
            "tag": args.get(1).cloned().unwrap_or(Value::Null),
        })
    })
}

/// Collects every entity a listener is called with.
#[derive(Clone, Default)]
pub struct Seen(pub Arc<Mutex<Vec<Entity>>>);

impl Seen {
    pub fn listener(&self) -> impl Fn(&Entity) + Send + Sync + 'static {
        let seen = Arc::clone(&self.0);
        move |entity: &Entity| seen.lock().push(entity.clone())
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn last(&self) -> Option<Entity> {
        self.0.lock().last().cloned()
    }
}
