//! Schema cache: a thread-safe map from kind to a fetched schema
//! descriptor, lazy-fetched on first use and guarded with `DashMap` rather
//! than a hand-rolled `RwLock<HashMap<_>>`.

use dashmap::DashMap;
use gatesync_core::EntityKind;
use std::future::Future;

/// Remote default values for unspecified fields on a kind, as returned by
/// the Gateway's `GetFullSchema` port call.
#[derive(Debug, Clone, Default)]
pub struct SchemaDescriptor {
    pub defaults: serde_json::Map<String, serde_json::Value>,
}

#[derive(Default)]
pub struct SchemaCache {
    cached: DashMap<EntityKind, SchemaDescriptor>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached descriptor for `kind`, fetching it via `fetch` on
    /// first use. A fetch failure (e.g. workspace-not-found) is swallowed
    /// and treated as "no defaults available" — the caller gets an empty
    /// descriptor, not an error.
    pub async fn get_or_fetch<F, Fut>(&self, kind: EntityKind, fetch: F) -> SchemaDescriptor
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<SchemaDescriptor>>,
    {
        if let Some(existing) = self.cached.get(&kind) {
            return existing.clone();
        }
        let descriptor = fetch().await.unwrap_or_default();
        self.cached.insert(kind, descriptor.clone());
        descriptor
    }

    pub fn invalidate(&self, kind: EntityKind) {
        self.cached.remove(&kind);
    }
}
