use crate::{StoreConfig, StoreError, StoreResult};
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Weak};
use strata_model::{
    Committer, Dispatch, Entity, EntityFactory, EntityResult, Patch, Updater, commit, make_entity,
    merge,
};
use tracing::{debug, info, warn};

type Listener = Arc<dyn Fn(&Entity) + Send + Sync>;

/// Holds the current entity of one instance and publishes every change.
///
/// Patches are applied one at a time, in the order they are dispatched,
/// against the latest published entity. Listeners run after the new entity
/// is published, one publication at a time and in publication order. A
/// listener may dispatch again; the nested publication is delivered right
/// away and the outer, now stale, delivery stops.
pub struct EntityStore {
    core: Arc<StoreCore>,
    /// Default updater for the entity it was created against.
    updater: Mutex<Option<Updater>>,
}

struct StoreCore {
    config: StoreConfig,
    current: Mutex<Published>,
    listeners: Mutex<ListenerTable>,
    /// Sequence number of the last publication handed to listeners.
    delivered: ReentrantMutex<Cell<u64>>,
}

struct Published {
    entity: Entity,
    seq: u64,
}

impl Published {
    /// Replaces the current entity and numbers the publication for delivery.
    fn publish(&mut self, entity: Entity) -> u64 {
        self.entity = entity;
        self.seq += 1;
        self.seq
    }
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

impl EntityStore {
    /// Builds the entity once with `initial_args` and starts holding it.
    pub fn new<F>(factory: &F, initial_args: &[Value]) -> StoreResult<Self>
    where
        F: EntityFactory + ?Sized,
    {
        Self::with_config(factory, initial_args, StoreConfig::default())
    }

    pub fn with_config<F>(factory: &F, initial_args: &[Value], config: StoreConfig) -> StoreResult<Self>
    where
        F: EntityFactory + ?Sized,
    {
        let entity = make_entity(factory, initial_args)?;
        info!(
            store = %config.name,
            entity_id = %entity.id(),
            entity_type = %entity.shape().entity_type,
            "entity store created"
        );
        Ok(Self {
            core: Arc::new(StoreCore {
                config,
                current: Mutex::new(Published { entity, seq: 0 }),
                listeners: Mutex::new(ListenerTable::default()),
                delivered: ReentrantMutex::new(Cell::new(0)),
            }),
            updater: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.core.config
    }

    /// The latest published entity.
    pub fn current(&self) -> Entity {
        self.core.current.lock().entity.clone()
    }

    /// Applies a patch to the current entity and publishes the result.
    pub fn dispatch(&self, patch: Option<Patch>) -> StoreResult<()> {
        Ok(self.core.dispatch(patch)?)
    }

    /// The store as a dispatch target, for binding custom handles.
    pub fn dispatcher(&self) -> Arc<dyn Dispatch> {
        self.core.clone()
    }

    /// Unrestricted updater bound to the current entity.
    ///
    /// Repeated calls return the same binding until the current entity
    /// changes.
    pub fn updater(&self) -> Updater {
        let current = self.current();
        let mut memo = self.updater.lock();
        match memo.as_ref() {
            Some(updater) if Entity::ptr_eq(updater.entity(), &current) => updater.clone(),
            _ => {
                let updater = Updater::bind(&current, self.dispatcher());
                *memo = Some(updater.clone());
                updater
            }
        }
    }

    /// Updater that only forwards the given keys.
    ///
    /// Each call builds a new handle. Compare restricted updaters with
    /// [`Updater::same_binding`]: it holds for two calls with the same keys
    /// until the current entity changes.
    pub fn restricted_updater<I, S>(&self, allowed: I) -> Updater
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Updater::restricted(&self.current(), self.dispatcher(), allowed)
    }

    /// Commit handle bound to the entity current at the time of the call.
    ///
    /// The handle commits and resets in two steps, so a patch dispatched in
    /// between is discarded by the reset. Use [`EntityStore::commit`] when
    /// other writers may be active.
    pub fn committer(&self) -> Committer {
        Committer::bind(&self.current(), self.dispatcher())
    }

    /// Commits the current entity's overlay into a new baseline and
    /// publishes the empty overlay on it, as one step with respect to
    /// dispatch. Returns the published entity.
    pub fn commit(&self) -> Entity {
        let (next, seq) = {
            let mut current = self.core.current.lock();
            let next = commit(&current.entity);
            let seq = current.publish(next.clone());
            (next, seq)
        };
        self.core.notify(&next, seq);
        next
    }

    /// The current entity together with its default updater.
    pub fn snapshot(&self) -> (Entity, Updater) {
        let updater = self.updater();
        (updater.entity().clone(), updater)
    }

    /// Registers a listener called with each newly published entity.
    ///
    /// The listener stays registered until the returned [`Subscription`]
    /// is dropped. Dispatches from other threads wait while a listener runs,
    /// so a listener must not block on another thread's dispatch.
    pub fn subscribe<L>(&self, listener: L) -> StoreResult<Subscription>
    where
        L: Fn(&Entity) + Send + Sync + 'static,
    {
        let mut table = self.core.listeners.lock();
        let max = self.core.config.max_listeners;
        if table.entries.len() >= max {
            warn!(store = %self.core.config.name, max, "listener limit reached");
            return Err(StoreError::ListenerLimit(max));
        }
        let id = table.next_id;
        table.next_id += 1;
        table.entries.push((id, Arc::new(listener)));
        debug!(store = %self.core.config.name, listener = id, "listener registered");
        Ok(Subscription {
            core: Arc::downgrade(&self.core),
            id,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.core.listeners.lock().entries.len()
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("config", &self.core.config)
            .field("current", &self.current())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl StoreCore {
    /// Delivers publication `seq` to every listener.
    ///
    /// Deliveries from different threads never overlap. A publication older
    /// than one already delivered is skipped, and a delivery stops early once
    /// a listener's own dispatch has delivered a newer one.
    fn notify(&self, entity: &Entity, seq: u64) {
        let delivered = self.delivered.lock();
        if seq <= delivered.get() {
            debug!(store = %self.config.name, seq, "stale notification skipped");
            return;
        }
        delivered.set(seq);
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            if delivered.get() != seq {
                break;
            }
            listener(entity);
        }
    }
}

impl Dispatch for StoreCore {
    fn dispatch(&self, patch: Option<Patch>) -> EntityResult<()> {
        let (next, changed, seq) = {
            let mut current = self.current.lock();
            let next = merge(&current.entity, patch.as_ref()).inspect_err(|e| {
                warn!(store = %self.config.name, error = %e, "patch rejected");
            })?;
            let changed = !Entity::ptr_eq(&current.entity, &next);
            let seq = if changed || self.config.notify_unchanged {
                Some(current.publish(next.clone()))
            } else {
                None
            };
            (next, changed, seq)
        };
        debug!(
            store = %self.config.name,
            changed,
            generation = next.generation(),
            overridden = next.own_field_count(),
            "patch dispatched"
        );
        if let Some(seq) = seq {
            self.notify(&next, seq);
        }
        Ok(())
    }
}

/// Keeps a listener registered. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    core: Weak<StoreCore>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.listeners.lock().entries.retain(|(id, _)| *id != self.id);
            debug!(store = %core.config.name, listener = self.id, "listener removed");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Creates a store for a new entity and returns it with the
/// `(entity, updater)` pair readers start from.
pub fn use_entity<F>(factory: &F, initial_args: &[Value]) -> StoreResult<(EntityStore, Entity, Updater)>
where
    F: EntityFactory + ?Sized,
{
    let store = EntityStore::new(factory, initial_args)?;
    let (entity, updater) = store.snapshot();
    Ok((store, entity, updater))
}
