//! Folding an overlay into a new baseline.

use crate::entity::Baseline;
use crate::{Dispatch, Entity, EntityResult, Patch};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Promotes the entity's overrides into a new baseline.
///
/// The new baseline holds the old baseline's fields overlaid by the
/// entity's overrides, under the same shape, one generation later.
///
/// `entity` itself is re-parented onto the new baseline, so handles to it
/// report the committed generation from now on. This is the only operation
/// that changes an existing handle. Baselines held elsewhere stay valid but
/// describe the older generation.
///
/// Returns an empty overlay on the new baseline.
pub fn commit(entity: &Entity) -> Entity {
    let previous = entity.baseline();
    let mut fields = previous.fields().clone();
    fields.extend(
        entity
            .overrides()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    let next = Baseline::new(
        Arc::clone(previous.shape()),
        previous.generation() + 1,
        fields,
    );
    entity.reparent(next);
    info!(
        entity_id = %entity.id(),
        generation = previous.generation() + 1,
        folded = entity.own_field_count(),
        "overlay committed"
    );
    entity.reset()
}

/// Commit handle bound to one entity and its dispatch target.
///
/// [`Committer::commit`] re-parents the bound entity, then dispatches a
/// reset so the target's current entity becomes the empty overlay on the
/// new baseline.
#[derive(Clone)]
pub struct Committer {
    entity: Entity,
    target: Arc<dyn Dispatch>,
}

impl Committer {
    pub fn bind(entity: &Entity, target: Arc<dyn Dispatch>) -> Self {
        Self {
            entity: entity.clone(),
            target,
        }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn commit(&self) -> EntityResult<()> {
        commit(&self.entity);
        self.target.dispatch(Some(Patch::Reset))
    }
}

impl fmt::Debug for Committer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Committer")
            .field("entity", &self.entity.id())
            .finish_non_exhaustive()
    }
}
