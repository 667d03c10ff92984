//! Patch submission.

use crate::{Entity, EntityResult, Patch};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Receives patches on behalf of whatever owns the current entity.
///
/// Implementations run [`merge`](crate::merge) against their current entity,
/// publish the result, and return any error to the submitter. `None` must be
/// passed through to `merge` so it can be rejected.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, patch: Option<Patch>) -> EntityResult<()>;
}

/// A patch-submission handle bound to one entity.
///
/// An unrestricted updater forwards patches unchanged. A restricted one
/// first projects each patch onto its allowed keys; the entity's own shape
/// filter still runs afterwards. Resets always pass through.
#[derive(Clone)]
pub struct Updater {
    entity: Entity,
    target: Arc<dyn Dispatch>,
    allowed: Option<Arc<[String]>>,
}

impl Updater {
    pub fn bind(entity: &Entity, target: Arc<dyn Dispatch>) -> Self {
        Self {
            entity: entity.clone(),
            target,
            allowed: None,
        }
    }

    /// An empty `allowed` list means unrestricted.
    pub fn restricted<I, S>(entity: &Entity, target: Arc<dyn Dispatch>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        Self {
            entity: entity.clone(),
            target,
            allowed: (!allowed.is_empty()).then(|| allowed.into()),
        }
    }

    pub fn update(&self, patch: Patch) -> EntityResult<()> {
        self.submit(Some(patch))
    }

    pub fn reset(&self) -> EntityResult<()> {
        self.submit(Some(Patch::Reset))
    }

    /// Submits the JSON form of a patch; see [`Patch::from_json`].
    pub fn update_json(&self, value: Value) -> EntityResult<()> {
        self.update(Patch::from_json(value)?)
    }

    /// Forwards a possibly missing patch. The target rejects `None`.
    pub fn submit(&self, patch: Option<Patch>) -> EntityResult<()> {
        let patch = match (&self.allowed, patch) {
            (Some(allowed), Some(patch)) => Some(patch.project(allowed)),
            (_, patch) => patch,
        };
        self.target.dispatch(patch)
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn allowed_keys(&self) -> Option<&[String]> {
        self.allowed.as_deref()
    }

    /// Same entity handle, same target, same key restriction.
    pub fn same_binding(a: &Updater, b: &Updater) -> bool {
        Entity::ptr_eq(&a.entity, &b.entity)
            && std::ptr::addr_eq(Arc::as_ptr(&a.target), Arc::as_ptr(&b.target))
            && a.allowed == b.allowed
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("entity", &self.entity.id())
            .field("allowed", &self.allowed)
            .finish_non_exhaustive()
    }
}
