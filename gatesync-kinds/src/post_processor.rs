//! Generic post-processor. One implementation, keyed off
//! `EntityKind::cascades_on_delete` and `cascade::cascade_children`, instead
//! of a hand-written post-processor per kind — the single place that
//! mutates the mirror after a remote change is applied.

use crate::cascade::cascade_children;
use gatesync_core::{Entity, EntityKind, Op};
use gatesync_registry::{PostProcessError, PostProcessor};
use gatesync_store::StateStore;

pub struct GenericPostProcessor {
    kind: EntityKind,
}

impl GenericPostProcessor {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }
}

impl PostProcessor for GenericPostProcessor {
    fn apply(&self, mirror: &StateStore, op: Op, result: &Entity) -> Result<(), PostProcessError> {
        let id = result.id.clone().ok_or_else(|| PostProcessError {
            kind: self.kind.to_string(),
            id: "<unassigned>".to_string(),
            message: "post-processed entity has no id".to_string(),
        })?;

        match op {
            Op::Create => {
                mirror.add_ignoring_duplicates(result.clone());
            }
            Op::Update => {
                mirror.update(result.clone()).map_err(|e| PostProcessError {
                    kind: self.kind.to_string(),
                    id: id.clone(),
                    message: e.to_string(),
                })?;
            }
            Op::Delete => {
                mirror.delete(self.kind, &id).map_err(|e| PostProcessError {
                    kind: self.kind.to_string(),
                    id: id.clone(),
                    message: e.to_string(),
                })?;
                for &child_kind in cascade_children(self.kind) {
                    for child in mirror.get_all_by_parent(child_kind, self.kind, &id) {
                        if let Some(child_id) = child.id {
                            let _ = mirror.delete(child_kind, &child_id);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
