//! Gateway HTTP port. One implementation per entity kind is not required —
//! a single generic port parameterized by `EntityKind` is enough, since the
//! remote shape (`PUT/GET/DELETE /{kind}/{id}`, `GET /schemas/{kind}`) is
//! uniform across kinds, implemented as an `async_trait` object registered
//! into a registry.

use async_trait::async_trait;
use gatesync_core::Entity;
use gatesync_store::SchemaDescriptor;
use thiserror::Error;

/// Remote call outcome taxonomy: transient vs permanent. Only `Http500` is
/// retried by the syncer; everything else, including `NotFound`, is
/// permanent.
#[derive(Error, Debug)]
pub enum PortError {
    #[error("http 500: {0}")]
    Http500(String),

    #[error("not found")]
    NotFound,

    #[error("http {status}: {message}")]
    Permanent { status: u16, message: String },
}

impl PortError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortError::Http500(_))
    }
}

/// Per-kind CRUD port against the Gateway's HTTP management API.
/// Implementations borrow the event's entity read-only for the duration of
/// the remote call and hand back a fresh entity reflecting the Gateway's
/// response; callers own that returned entity from then on.
#[async_trait]
pub trait EntityPort: Send + Sync {
    async fn create(&self, entity: &Entity) -> Result<Entity, PortError>;
    async fn update(&self, entity: &Entity) -> Result<Entity, PortError>;
    async fn delete(&self, entity: &Entity) -> Result<(), PortError>;

    /// Used by the differ to detect an id collision against a live entity
    /// with a different natural key.
    async fn get_by_id(&self, id: &str) -> Result<Option<Entity>, PortError>;

    /// Fetches the kind's remote schema, used for default-filling. A `None`
    /// return means no schema is available (e.g. workspace not found) and
    /// callers should fall back to no remote defaults.
    async fn get_full_schema(&self) -> Result<Option<SchemaDescriptor>, PortError>;
}
