//! Entity instance ids.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Names one entity instance.
///
/// [`make_entity`](crate::make_entity) mints a fresh id per call. Patches,
/// resets and commits carry it forward, so every overlay in an instance's
/// history logs under the same id. Ids are time-ordered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub(crate) fn mint() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// When the instance was made, in milliseconds since the Unix epoch.
    pub fn created_at_millis(&self) -> u64 {
        self.0.get_timestamp().map_or(0, |ts| {
            let (secs, nanos) = ts.to_unix();
            secs * 1_000 + u64::from(nanos) / 1_000_000
        })
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0.simple())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
