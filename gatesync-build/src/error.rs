use gatesync_core::{CoreError, EntityKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{kind} {field} references unknown {ref_kind} \"{reference}\"")]
    UnresolvedReference {
        kind: EntityKind,
        field: String,
        ref_kind: EntityKind,
        reference: String,
    },

    #[error("{kind} declares a plugin scoped to both a consumer and a consumer group, which this gateway does not support")]
    PluginScopeConflict { kind: EntityKind },

    #[error(
        "rate-limiting-advanced sets legacy consumer_groups/enforce_consumer_groups fields \
         while consumer-group-scoped rate-limiting-advanced plugins are also declared; set \
         consumer_group_policy_overrides to allow the legacy form on this gateway version"
    )]
    ConsumerGroupPolicyConflict,
}
