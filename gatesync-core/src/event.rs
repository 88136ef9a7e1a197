//! Event envelope. Lives in `gatesync-core` rather than `gatesync-sync`
//! because the differ trait (`gatesync-registry::differ`) and its per-kind
//! implementations (`gatesync-kinds`) both need to construct and match on
//! it, and both sit below `gatesync-sync` in the dependency graph.

use crate::entity::{Entity, EntityKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Create,
    Update,
    Delete,
}

/// One intended remote operation, emitted by a kind's differ in a
/// deterministic, stably-sorted order.
#[derive(Debug, Clone)]
pub struct Event {
    pub op: Op,
    pub kind: EntityKind,
    pub obj: Entity,
    /// Populated only for updates.
    pub old_obj: Option<Entity>,
}

impl Event {
    pub fn create(kind: EntityKind, obj: Entity) -> Self {
        Self {
            op: Op::Create,
            kind,
            obj,
            old_obj: None,
        }
    }

    pub fn update(kind: EntityKind, obj: Entity, old_obj: Entity) -> Self {
        Self {
            op: Op::Update,
            kind,
            obj,
            old_obj: Some(old_obj),
        }
    }

    pub fn delete(kind: EntityKind, obj: Entity) -> Self {
        Self {
            op: Op::Delete,
            kind,
            obj,
            old_obj: None,
        }
    }

    /// `(kind, id)` identity used to enforce that no id is emitted twice
    /// within a single differ pass.
    pub fn identity(&self) -> (EntityKind, Option<String>) {
        (self.kind, self.obj.id.clone())
    }
}
