//! Entity-kind registry: a `HashMap` built once at startup
//! (`register`/`get`), keyed on `EntityKind` rather than a flat unordered
//! list, with leveled, topologically-orderable iteration.

use crate::differ::Differ;
use crate::port::EntityPort;
use crate::post_processor::PostProcessor;
use gatesync_core::EntityKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the syncer needs to drive one kind: its remote port, its
/// differ, its post-processor, and its dependency level.
pub struct KindPlan {
    pub kind: EntityKind,
    pub level: u32,
    pub port: Arc<dyn EntityPort>,
    pub differ: Arc<dyn Differ>,
    pub post_processor: Arc<dyn PostProcessor>,
}

/// The topological order: `certificates → SNI → CA-certificates →
/// service-packages → service-versions → documents → services → routes →
/// consumers → consumer-groups → consumer-group-consumers → plugins →
/// filter-chains → upstreams → targets → credentials → vaults → keys →
/// key-sets → partials → custom-entities → RBAC → licenses`.
pub fn dependency_level(kind: EntityKind) -> u32 {
    use EntityKind::*;
    match kind {
        Certificate => 1,
        Sni => 2,
        CaCertificate => 3,
        ServicePackage => 4,
        ServiceVersion => 5,
        Document => 6,
        Service => 7,
        Route => 8,
        Consumer => 9,
        ConsumerGroup => 10,
        ConsumerGroupConsumer => 11,
        ConsumerGroupPlugin => 12,
        Plugin => 13,
        FilterChain => 14,
        Upstream => 15,
        Target => 16,
        KeyAuth | BasicAuth | HmacAuth | JwtAuth | Oauth2Credential | AclGroup | MtlsAuth => 17,
        Vault => 18,
        Key => 19,
        KeySet => 20,
        Partial => 21,
        CustomEntity => 22,
        RbacRole | RbacEndpointPermission => 23,
        License => 24,
    }
}

/// Process-wide table mapping each kind to its `KindPlan`, built once at
/// syncer start-up.
#[derive(Default)]
pub struct KindRegistry {
    plans: HashMap<EntityKind, KindPlan>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plan: KindPlan) {
        tracing::info!(kind = %plan.kind, level = plan.level, "registered entity kind");
        self.plans.insert(plan.kind, plan);
    }

    pub fn get(&self, kind: EntityKind) -> Option<&KindPlan> {
        self.plans.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Forward order: ascending level, stable tie-break on `EntityKind::ALL`
    /// declaration order — parents before children, for creates/updates.
    pub fn forward_order(&self) -> Vec<EntityKind> {
        self.ordered(false)
    }

    /// Reverse order: descending level — children before parents, for
    /// deletes (and the duplicate-delete phase that runs before them).
    pub fn reverse_order(&self) -> Vec<EntityKind> {
        self.ordered(true)
    }

    fn ordered(&self, reverse: bool) -> Vec<EntityKind> {
        let mut kinds: Vec<EntityKind> = self.plans.keys().copied().collect();
        kinds.sort_by_key(|k| {
            let declared_index = EntityKind::ALL.iter().position(|c| c == k).unwrap_or(usize::MAX);
            (self.plans[k].level, declared_index)
        });
        if reverse {
            kinds.reverse();
        }
        kinds
    }
}
