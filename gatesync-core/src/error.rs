use thiserror::Error;

/// Error taxonomy shared across the build/differ/sync crates. Variants
/// carry enough context for a reporter to correlate by `{kind, name}`.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("schema violation ({kind}): {message}")]
    Validation { kind: String, message: String },

    #[error("parent not found: {kind} references {parent_kind} {reference}")]
    Reference {
        kind: String,
        parent_kind: String,
        reference: String,
    },

    #[error("identity collision: declared id {id} on {kind} matches a live entity of a different natural key")]
    IdentityCollision { kind: String, id: String },

    #[error("{kind} {name}: {cause}")]
    Action {
        operation: String,
        kind: String,
        name: String,
        cause: String,
    },
}

impl CoreError {
    /// True only for the remote-transient case (HTTP 500), which is not a
    /// `CoreError` variant itself — ports classify their own errors. This
    /// exists so downstream crates share one naming convention
    /// (`is_retryable`).
    pub fn is_retryable(&self) -> bool {
        false
    }
}
