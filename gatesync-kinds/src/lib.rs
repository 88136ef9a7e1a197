pub mod cascade;
pub mod generic_differ;
pub mod normalize;
pub mod post_processor;

pub use cascade::cascade_children;
pub use generic_differ::{GenericDiffer, KindHooks, PlainHooks};
pub use post_processor::GenericPostProcessor;

use gatesync_core::EntityKind;
use gatesync_registry::{dependency_level, EntityPort, KindPlan};
use std::sync::Arc;

/// Assembles one `KindPlan` for `kind` out of the generic differ/
/// post-processor pair plus a caller-supplied port (the port is peripheral
/// — `gatesync-client`'s `reqwest`-based implementation in the real
/// binary, a fake in tests).
pub fn kind_plan(kind: EntityKind, port: Arc<dyn EntityPort>) -> KindPlan {
    KindPlan {
        kind,
        level: dependency_level(kind),
        port,
        differ: Arc::new(GenericDiffer::new(PlainHooks(kind))),
        post_processor: Arc::new(GenericPostProcessor::new(kind)),
    }
}
