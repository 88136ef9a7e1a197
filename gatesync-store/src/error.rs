use gatesync_core::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} with id {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    #[error("{kind} with id {id} not found")]
    NotFound { kind: EntityKind, id: String },
}
