//! Post-processor trait. Updates the current-state mirror after a
//! successful remote CRUD call and, for cascading kinds, removes dependent
//! children on delete.

use gatesync_core::{Entity, Op};
use gatesync_store::StateStore;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("post-processing failed for {kind} {id}: {message}")]
pub struct PostProcessError {
    pub kind: String,
    pub id: String,
    pub message: String,
}

/// Applies the effect of one successful remote operation to `mirror`.
/// `result` is the entity the CRUD port handed back (for deletes, the
/// pre-delete entity, so cascade lookups still have its id).
pub trait PostProcessor: Send + Sync {
    fn apply(&self, mirror: &StateStore, op: Op, result: &Entity) -> Result<(), PostProcessError>;
}
