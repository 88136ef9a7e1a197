//! Differ trait. Implementations live in `gatesync-kinds`; this crate only
//! defines the contract so `gatesync-registry::registry::KindPlan` can hold
//! one per kind as a trait object.

use gatesync_core::{CoreError, Event};
use gatesync_store::StateStore;

/// Given (current, target) state stores, emits the events needed to
/// converge one kind. Every emission is synchronous and ordered
/// deterministically (stable sort over the kind's natural key), so the
/// engine can rely on emission order without extra synchronization.
pub trait Differ: Send + Sync {
    /// Create/update logic. `emit` is called once per event, in order.
    /// `schema_defaults` is the kind's cached remote schema defaults,
    /// fetched by the caller (the schema fetch is async; the differ itself
    /// stays synchronous so event emission order is a plain in-process
    /// guarantee, not something threaded through an executor).
    fn create_and_updates(
        &self,
        current: &StateStore,
        target: &StateStore,
        schema_defaults: &serde_json::Map<String, serde_json::Value>,
        emit: &mut dyn FnMut(gatesync_core::Event),
    ) -> Result<(), CoreError>;

    /// Delete logic.
    fn deletes(&self, current: &StateStore, target: &StateStore, emit: &mut dyn FnMut(Event));

    /// Duplicate-delete logic, implemented only by kinds whose natural key
    /// can collide across ids. Default: no-op.
    fn duplicate_deletes(&self, _current: &StateStore, _target: &StateStore, _emit: &mut dyn FnMut(Event)) {}
}
