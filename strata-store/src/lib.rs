//! Reducer loop for strata entities.
//!
//! [`EntityStore`] owns the current entity of one entity instance. It runs
//! [`strata_model::merge`] for every dispatched patch, publishes the result,
//! and notifies subscribers. [`use_entity`] is the one-call setup that hands
//! back the store together with the `(entity, updater)` pair.

mod config;
mod error;
mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::{EntityStore, Subscription, use_entity};
