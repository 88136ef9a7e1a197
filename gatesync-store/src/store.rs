//! In-memory state store. One `KindStore` per `EntityKind`, `DashMap`-backed
//! so one `Arc<DashMap<String, T>>` covers each resource type. Every read
//! returns an owned clone so callers can never corrupt the index in place.

use crate::error::StoreError;
use dashmap::DashMap;
use gatesync_core::{Entity, EntityKind, ForeignRef, IdOrName, NaturalKey};
use std::sync::Arc;

/// A single kind's indexed container: primary map by id, plus a secondary
/// lookup from natural-key string to id so `Get(idOrNaturalKey)` resolves
/// either way without a linear scan.
#[derive(Default)]
struct KindStore {
    by_id: DashMap<String, Entity>,
    by_natural_key: DashMap<String, String>,
}

impl KindStore {
    fn index_natural_key(&self, entity: &Entity) {
        if let Some(key) = entity.natural_key.as_lookup_string() {
            if let Some(id) = &entity.id {
                self.by_natural_key.insert(key, id.clone());
            }
        }
    }

    fn deindex_natural_key(&self, entity: &Entity) {
        if let Some(key) = entity.natural_key.as_lookup_string() {
            self.by_natural_key.remove(&key);
        }
    }
}

/// The full state store: one `KindStore` per kind in `EntityKind::ALL`.
/// Used both as the "current state" mirror the syncer owns and as the
/// build-time "raw state"/"intermediate store" the builder populates.
pub struct StateStore {
    kinds: DashMap<EntityKind, Arc<KindStore>>,
}

impl StateStore {
    pub fn new() -> Self {
        let kinds = DashMap::new();
        for kind in EntityKind::ALL {
            kinds.insert(*kind, Arc::new(KindStore::default()));
        }
        Self { kinds }
    }

    fn kind_store(&self, kind: EntityKind) -> Arc<KindStore> {
        self.kinds
            .get(&kind)
            .map(|e| e.clone())
            .unwrap_or_else(|| Arc::new(KindStore::default()))
    }

    /// Fails with `AlreadyExists` when the primary key collides.
    pub fn add(&self, entity: Entity) -> Result<(), StoreError> {
        let kind = entity.kind;
        let id = entity
            .id
            .clone()
            .expect("builder must assign an id before inserting into the store");
        let store = self.kind_store(kind);
        if store.by_id.contains_key(&id) {
            return Err(StoreError::AlreadyExists { kind, id });
        }
        store.index_natural_key(&entity);
        store.by_id.insert(id, entity);
        Ok(())
    }

    /// Silently succeeds on collision. Used during build when the same
    /// consumer may be referenced via multiple consumer groups.
    pub fn add_ignoring_duplicates(&self, entity: Entity) {
        let id = entity
            .id
            .clone()
            .expect("builder must assign an id before inserting into the store");
        let store = self.kind_store(entity.kind);
        if store.by_id.contains_key(&id) {
            return;
        }
        store.index_natural_key(&entity);
        store.by_id.insert(id, entity);
    }

    /// Fails with `NotFound` for an unknown id.
    pub fn update(&self, entity: Entity) -> Result<(), StoreError> {
        let kind = entity.kind;
        let id = entity
            .id
            .clone()
            .expect("update requires an assigned id");
        let store = self.kind_store(kind);
        if !store.by_id.contains_key(&id) {
            return Err(StoreError::NotFound { kind, id });
        }
        if let Some(old) = store.by_id.get(&id) {
            store.deindex_natural_key(&old);
        }
        store.index_natural_key(&entity);
        store.by_id.insert(id, entity);
        Ok(())
    }

    /// Fails with `NotFound` for an unknown id.
    pub fn delete(&self, kind: EntityKind, id: &str) -> Result<Entity, StoreError> {
        let store = self.kind_store(kind);
        let (_, entity) = store.by_id.remove(id).ok_or_else(|| StoreError::NotFound {
            kind,
            id: id.to_string(),
        })?;
        store.deindex_natural_key(&entity);
        Ok(entity)
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<Entity> {
        self.kind_store(kind).by_id.get(id).map(|e| e.clone())
    }

    pub fn get_by_natural_key(&self, kind: EntityKind, key: &NaturalKey) -> Option<Entity> {
        let lookup = key.as_lookup_string()?;
        let store = self.kind_store(kind);
        let id = store.by_natural_key.get(&lookup)?.clone();
        store.by_id.get(&id).map(|e| e.clone())
    }

    /// Deterministic order: lexicographic by id (the store has no other
    /// stable primary key to sort by; callers needing natural-key ordering
    /// re-sort at output time over the kind's natural key).
    pub fn get_all(&self, kind: EntityKind) -> Vec<Entity> {
        let store = self.kind_store(kind);
        let mut all: Vec<Entity> = store.by_id.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Secondary lookup: all entities of `kind` whose foreign refs include
    /// `parent_id` for `parent_kind` (e.g. `GetAllByServiceID`).
    pub fn get_all_by_parent(
        &self,
        kind: EntityKind,
        parent_kind: EntityKind,
        parent_id: &str,
    ) -> Vec<Entity> {
        self.get_all(kind)
            .into_iter()
            .filter(|e| references_parent(&e.foreign_refs, parent_kind, parent_id))
            .collect()
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.kind_store(kind).by_id.len()
    }

    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.len(kind) == 0
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn references_parent(refs: &[ForeignRef], parent_kind: EntityKind, parent_id: &str) -> bool {
    refs.iter().any(|r| {
        r.kind == parent_kind
            && match &r.id_or_name {
                IdOrName::Id(id) => id == parent_id,
                IdOrName::Name(_) => false,
            }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc(id: &str, name: &str) -> Entity {
        let mut e = Entity::new(
            EntityKind::Service,
            NaturalKey::Name(name.to_string()),
            serde_json::json!({"protocol": "http"}),
        );
        e.id = Some(id.to_string());
        e
    }

    #[test]
    fn add_then_get_round_trips() {
        let store = StateStore::new();
        store.add(svc("A", "foo")).unwrap();
        let got = store.get(EntityKind::Service, "A").unwrap();
        assert_eq!(got.id.as_deref(), Some("A"));
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let store = StateStore::new();
        store.add(svc("A", "foo")).unwrap();
        let err = store.add(svc("A", "bar")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn add_ignoring_duplicates_is_silent() {
        let store = StateStore::new();
        store.add_ignoring_duplicates(svc("A", "foo"));
        store.add_ignoring_duplicates(svc("A", "bar"));
        // first insert wins; no error surfaced
        let got = store.get(EntityKind::Service, "A").unwrap();
        assert_eq!(got.natural_key, NaturalKey::Name("foo".to_string()));
    }

    #[test]
    fn update_requires_existing_id() {
        let store = StateStore::new();
        let err = store.update(svc("A", "foo")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn delete_requires_existing_id() {
        let store = StateStore::new();
        let err = store.delete(EntityKind::Service, "A").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn get_by_natural_key_resolves_after_add() {
        let store = StateStore::new();
        store.add(svc("A", "foo")).unwrap();
        let got = store
            .get_by_natural_key(EntityKind::Service, &NaturalKey::Name("foo".to_string()))
            .unwrap();
        assert_eq!(got.id.as_deref(), Some("A"));
    }

    #[test]
    fn delete_removes_natural_key_index() {
        let store = StateStore::new();
        store.add(svc("A", "foo")).unwrap();
        store.delete(EntityKind::Service, "A").unwrap();
        assert!(store
            .get_by_natural_key(EntityKind::Service, &NaturalKey::Name("foo".to_string()))
            .is_none());
    }

    #[test]
    fn get_all_is_sorted_by_id() {
        let store = StateStore::new();
        store.add(svc("B", "b")).unwrap();
        store.add(svc("A", "a")).unwrap();
        let all = store.get_all(EntityKind::Service);
        assert_eq!(all[0].id.as_deref(), Some("A"));
        assert_eq!(all[1].id.as_deref(), Some("B"));
    }

    #[test]
    fn get_all_by_parent_filters_by_foreign_ref() {
        let store = StateStore::new();
        let mut route = Entity::new(
            EntityKind::Route,
            NaturalKey::Name("r".to_string()),
            serde_json::json!({}),
        );
        route.id = Some("R1".to_string());
        route.foreign_refs.push(ForeignRef {
            kind: EntityKind::Service,
            id_or_name: IdOrName::Id("S1".to_string()),
        });
        store.add(route).unwrap();
        let matches = store.get_all_by_parent(EntityKind::Route, EntityKind::Service, "S1");
        assert_eq!(matches.len(), 1);
        let none = store.get_all_by_parent(EntityKind::Route, EntityKind::Service, "S2");
        assert!(none.is_empty());
    }

    #[test]
    fn reads_return_deep_copies() {
        let store = StateStore::new();
        store.add(svc("A", "foo")).unwrap();
        let mut got = store.get(EntityKind::Service, "A").unwrap();
        got.attrs = serde_json::json!({"mutated": true});
        let still_original = store.get(EntityKind::Service, "A").unwrap();
        assert_ne!(still_original.attrs, got.attrs);
    }
}
