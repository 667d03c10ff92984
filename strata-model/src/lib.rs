//! Core entity state model for strata.
//!
//! An entity is a committed, frozen **baseline** plus an immutable **overlay**
//! of uncommitted field changes. Readers always see the merged view; writers
//! submit patches that produce new overlays, never touching published data.
//!
//! - [`Shape`]: the static field declaration of an entity type
//! - [`FrozenValue`] / [`deep_freeze`]: immutable JSON-like values with shared subtrees
//! - [`EntityFactory`] / [`make_entity`]: builds generation 0 of an entity
//! - [`Patch`] / [`merge`]: the overlay reducer
//! - [`commit`] / [`Committer`]: folds the overlay into a new baseline
//! - [`Dispatch`] / [`Updater`]: patch submission, optionally key-restricted
//!
//! Nothing in this crate performs I/O. The reducer loop that owns the current
//! entity lives in `strata-store`.

mod commit;
mod entity;
mod error;
mod factory;
mod frozen;
mod ids;
mod merge;
mod patch;
mod shape;
mod updater;

pub use commit::{Committer, commit};
pub use entity::{Baseline, Entity, Fields};
pub use error::{EntityError, EntityResult};
pub use factory::{Class, EntityFactory, make_entity};
pub use frozen::{FrozenValue, deep_freeze};
pub use ids::EntityId;
pub use merge::merge;
pub use patch::Patch;
pub use shape::{FieldDef, FieldType, Shape};
pub use updater::{Dispatch, Updater};
