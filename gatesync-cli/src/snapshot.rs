//! File-based current-state snapshot, standing in for a live query against
//! the Gateway's own HTTP management API. Saves with an atomic
//! write-to-tmp-then-rename and loads silently-empty on missing or
//! malformed files, one `Vec<Entity>` per `EntityKind`.

use gatesync_core::{Entity, EntityKind};
use gatesync_store::StateStore;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct PersistedSnapshot {
    #[serde(default)]
    kinds: HashMap<String, Vec<Entity>>,
}

/// Writes every kind's entities to `path` atomically (tmp file + rename),
/// so a crash mid-write never corrupts the on-disk snapshot.
pub fn save(store: &StateStore, path: &Path) -> anyhow::Result<()> {
    let mut kinds = HashMap::new();
    for kind in EntityKind::ALL {
        let entities = store.get_all(*kind);
        if !entities.is_empty() {
            kinds.insert(kind.to_string(), entities);
        }
    }
    let snapshot = PersistedSnapshot { kinds };
    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)?;
    std::fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "snapshot saved");
    Ok(())
}

/// Loads a previously saved snapshot into a fresh `StateStore`. Missing or
/// malformed files are treated as "no current state" (first run against a
/// gateway this tool has never reconciled before), logged but not fatal.
pub fn load(path: &Path) -> StateStore {
    let store = StateStore::new();
    if !path.exists() {
        tracing::info!(path = %path.display(), "no snapshot found, starting from empty current state");
        return store;
    }
    let data = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "failed to read snapshot");
            return store;
        }
    };
    let persisted: PersistedSnapshot = match serde_json::from_str(&data) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "snapshot is malformed, ignoring");
            return store;
        }
    };
    let mut total = 0usize;
    for kind in EntityKind::ALL {
        if let Some(entities) = persisted.kinds.get(&kind.to_string()) {
            for entity in entities.iter().cloned() {
                total += 1;
                store.add_ignoring_duplicates(entity);
            }
        }
    }
    tracing::info!(entities = total, path = %path.display(), "snapshot restored");
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesync_core::NaturalKey;
    use tempfile::tempdir;

    fn svc(id: &str) -> Entity {
        let mut e = Entity::new(EntityKind::Service, NaturalKey::Name("foo".to_string()), serde_json::json!({"protocol": "http"}));
        e.id = Some(id.to_string());
        e
    }

    #[test]
    fn round_trips_entities_across_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let store = StateStore::new();
        store.add(svc("A")).unwrap();
        save(&store, &path).unwrap();

        let restored = load(&path);
        assert!(restored.get(EntityKind::Service, "A").is_some());
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let store = load(&path);
        assert!(store.is_empty(EntityKind::Service));
    }

    #[test]
    fn malformed_file_yields_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json {{{").unwrap();
        let store = load(&path);
        assert!(store.is_empty(EntityKind::Service));
    }
}
