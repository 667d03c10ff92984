//! The overlay reducer.

use crate::{Entity, EntityError, EntityResult, Patch};
use std::sync::Arc;
use tracing::{debug, warn};

/// Computes the entity that results from applying `patch` to `current`.
///
/// `None` stands for "no patch given" and is rejected with
/// [`EntityError::InvalidPatch`]; discarding changes must be asked for
/// explicitly with [`Patch::Reset`]. See [`Entity::apply`] for the rest.
///
/// Pure: the result depends only on `current` and `patch`.
pub fn merge(current: &Entity, patch: Option<&Patch>) -> EntityResult<Entity> {
    match patch {
        Some(patch) => current.apply(patch),
        None => {
            warn!(entity_id = %current.id(), "missing patch rejected");
            Err(EntityError::InvalidPatch(
                "no patch given; use Patch::Reset to discard changes".into(),
            ))
        }
    }
}

impl Entity {
    /// Applies a patch, returning the next overlay.
    ///
    /// - `Reset`: empty overlay on the same baseline.
    /// - `Set`: keys outside the shape are dropped. Kept values must match
    ///   their field type. If no key survives, `self` is returned as the same
    ///   handle. Otherwise the surviving assignments are layered over the
    ///   current overrides; untouched overrides are shared, not copied.
    pub fn apply(&self, patch: &Patch) -> EntityResult<Entity> {
        let changes = match patch {
            Patch::Reset => {
                debug!(entity_id = %self.id(), discarded = self.own_field_count(), "overlay reset");
                return Ok(self.reset());
            }
            Patch::Set(changes) => changes,
        };

        let shape = self.shape();
        let mut accepted = Vec::with_capacity(changes.len());
        let mut dropped = Vec::new();
        for (key, value) in changes {
            match shape.field(key) {
                Some(def) => {
                    def.check(value)?;
                    accepted.push((key, value));
                }
                None => dropped.push(key.as_str()),
            }
        }
        if !dropped.is_empty() {
            debug!(entity_id = %self.id(), ?dropped, "ignoring fields outside the entity shape");
        }
        if accepted.is_empty() {
            return Ok(self.clone());
        }

        let mut overrides = self.overrides().clone();
        for (key, value) in accepted {
            overrides.insert(key.clone(), value.clone());
        }
        debug!(entity_id = %self.id(), overridden = overrides.len(), "patch applied");
        Ok(self.with_overrides(Arc::new(overrides)))
    }
}
