//! One `Differ` implementation driven by small per-kind hook tables,
//! avoiding one struct per entity kind the way a hand-written
//! `RouteDiffer`/`ServiceDiffer`/... family would.
//!
//! The declared-id-collision check (call the CRUD port's `get_by_id` before
//! emitting a Create for a declared id) needs a live remote call, which
//! would make this trait async. It is deliberately deferred to
//! `gatesync-sync::engine`'s dispatch step, which already owns the port and
//! runs inside an async worker — see DESIGN.md.

use gatesync_core::{CoreError, Entity, EntityKind, Event};
use gatesync_registry::Differ;
use gatesync_store::StateStore;
use serde_json::{Map, Value};

/// Per-kind behavior the generic differ needs beyond what `Entity` already
/// carries: how to merge schema defaults onto an entity's `attrs` before
/// equality comparison.
pub trait KindHooks: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Fills `schema_defaults` onto `attrs` for any key `attrs` does not
    /// already declare. A no-op default is fine for kinds with no schema.
    fn fill_defaults(&self, attrs: &mut Value, schema_defaults: &Map<String, Value>) {
        let Value::Object(map) = attrs else { return };
        for (k, v) in schema_defaults {
            map.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

/// A hook table with no kind-specific default-filling behavior — sufficient
/// for most kinds, since `KindHooks::fill_defaults`'s default impl already
/// does the generic "fill-if-absent" merge.
pub struct PlainHooks(pub EntityKind);

impl KindHooks for PlainHooks {
    fn kind(&self) -> EntityKind {
        self.0
    }
}

pub struct GenericDiffer<H: KindHooks> {
    hooks: H,
}

impl<H: KindHooks> GenericDiffer<H> {
    pub fn new(hooks: H) -> Self {
        Self { hooks }
    }
}

impl<H: KindHooks> Differ for GenericDiffer<H> {
    fn create_and_updates(
        &self,
        current: &StateStore,
        target: &StateStore,
        schema_defaults: &Map<String, Value>,
        emit: &mut dyn FnMut(Event),
    ) -> Result<(), CoreError> {
        let kind = self.hooks.kind();
        let mut targets = target.get_all(kind);
        targets.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        for mut entity in targets {
            self.hooks.fill_defaults(&mut entity.attrs, schema_defaults);

            let Some(id) = entity.id.clone() else {
                return Err(CoreError::Validation {
                    kind: kind.to_string(),
                    message: "target entity missing assigned id".to_string(),
                });
            };

            match current.get(kind, &id) {
                None => emit(Event::create(kind, entity)),
                Some(existing) => {
                    if !existing.equals_ignoring_timestamps_and_fk_names(&entity) {
                        emit(Event::update(kind, entity, existing));
                    }
                }
            }
        }
        Ok(())
    }

    fn deletes(&self, current: &StateStore, target: &StateStore, emit: &mut dyn FnMut(Event)) {
        let kind = self.hooks.kind();
        let mut currents = current.get_all(kind);
        currents.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        for entity in currents {
            let Some(id) = entity.id.clone() else { continue };
            if target.get(kind, &id).is_none() {
                emit(Event::delete(kind, entity));
            }
        }
    }

    fn duplicate_deletes(&self, current: &StateStore, target: &StateStore, emit: &mut dyn FnMut(Event)) {
        let kind = self.hooks.kind();
        if !kind.supports_duplicate_delete() {
            return;
        }
        let mut targets = target.get_all(kind);
        targets.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        for entity in targets {
            let Some(existing) = current.get_by_natural_key(kind, &entity.natural_key) else {
                continue;
            };
            if existing.id != entity.id {
                emit(Event::delete(kind, existing));
            }
        }
    }
}

fn sort_key(entity: &Entity) -> String {
    entity
        .natural_key
        .as_lookup_string()
        .unwrap_or_else(|| entity.id.clone().unwrap_or_default())
}
