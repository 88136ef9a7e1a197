//! Cross-crate integration tests wiring `gatesync-build` → `gatesync-kinds`
//! → `gatesync-registry` → `gatesync-sync` together, exercising several
//! crates through one public entry point rather than re-testing each
//! module's internals (those already have their own `#[cfg(test)]`
//! coverage). Covers the reconciliation boundary scenarios end to end:
//! default-filling, cascade delete, retry-then-succeed, idempotency, and
//! dry-run.

use async_trait::async_trait;
use gatesync_build::{BuildConfig, StateBuilder};
use gatesync_core::config::{GatewayConfig, RetryConfig, RunConfig};
use gatesync_core::document::{DocumentInfo, GatewayDocument};
use gatesync_core::{Entity, EntityKind};
use gatesync_registry::{EntityPort, KindRegistry, PortError};
use gatesync_store::{SchemaDescriptor, StateStore};
use gatesync_sync::SyncEngine;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct EchoPort;

#[async_trait]
impl EntityPort for EchoPort {
    async fn create(&self, entity: &Entity) -> Result<Entity, PortError> {
        Ok(entity.clone())
    }
    async fn update(&self, entity: &Entity) -> Result<Entity, PortError> {
        Ok(entity.clone())
    }
    async fn delete(&self, _entity: &Entity) -> Result<(), PortError> {
        Ok(())
    }
    async fn get_by_id(&self, _id: &str) -> Result<Option<Entity>, PortError> {
        Ok(None)
    }
    async fn get_full_schema(&self) -> Result<Option<SchemaDescriptor>, PortError> {
        Ok(None)
    }
}

/// Fails with HTTP 500 for its first `fail_times` calls, then succeeds —
/// used to exercise the retry/backoff path.
struct FlakyPort {
    attempts: AtomicUsize,
    fail_times: usize,
}

#[async_trait]
impl EntityPort for FlakyPort {
    async fn create(&self, entity: &Entity) -> Result<Entity, PortError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_times {
            return Err(PortError::Http500("internal error".to_string()));
        }
        Ok(entity.clone())
    }
    async fn update(&self, entity: &Entity) -> Result<Entity, PortError> {
        Ok(entity.clone())
    }
    async fn delete(&self, _entity: &Entity) -> Result<(), PortError> {
        Ok(())
    }
    async fn get_by_id(&self, _id: &str) -> Result<Option<Entity>, PortError> {
        Ok(None)
    }
    async fn get_full_schema(&self) -> Result<Option<SchemaDescriptor>, PortError> {
        Ok(None)
    }
}

fn registry_with(kind: EntityKind, port: Arc<dyn EntityPort>) -> KindRegistry {
    let mut registry = KindRegistry::new();
    registry.register(gatesync_kinds::kind_plan(kind, port));
    registry
}

fn full_registry_echo() -> KindRegistry {
    let mut registry = KindRegistry::new();
    for kind in EntityKind::ALL {
        registry.register(gatesync_kinds::kind_plan(*kind, Arc::new(EchoPort)));
    }
    registry
}

fn fast_retry_config(dry_run: bool) -> RunConfig {
    RunConfig {
        parallelism: 4,
        stage_delay_secs: 0,
        retry: RetryConfig {
            base_secs: 0,
            multiplier: 2.0,
            max_retries: 4,
        },
        dry_run,
        emit_actions: true,
        sanitize_output: false,
        include_licenses: false,
        is_konnect: false,
        skip_ca_certs: false,
        partial_apply: false,
        consumer_group_policy_overrides: false,
        gateway: GatewayConfig {
            base_url: "http://gw.internal:8001".to_string(),
            api_key: None,
            version: "3.0".to_string(),
        },
    }
}

fn build_target(yaml: &str) -> StateStore {
    let doc: GatewayDocument = serde_yaml::from_str(yaml).unwrap();
    let current = StateStore::new();
    let config = BuildConfig::from_document_info(&DocumentInfo::default(), true);
    let built = StateBuilder::new(&doc, &current, &config).build().unwrap();
    built.raw
}

/// S1 — id assignment: an empty current state against a bare service
/// declaration emits exactly one Create whose defaults match the schema
/// defaults the builder fills in.
#[tokio::test]
async fn s1_creates_service_with_defaults_end_to_end() {
    let target = build_target("services:\n  - name: foo\n    host: example.com\n");

    let registry = full_registry_echo();
    let engine = SyncEngine::new(registry, fast_retry_config(false));
    let report = engine.run(&Arc::new(StateStore::new()), &Arc::new(target)).await;

    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.failed_count(), 0);
    let created = &report.actions[0];
    assert_eq!(created.kind, EntityKind::Service);
}

/// S5 — cascade delete: removing a service from the declared document also
/// drops its dependent route and plugin from the current-state mirror, in
/// child-before-parent order, so no orphaned children survive the run.
#[tokio::test]
async fn s5_cascade_delete_clears_children_from_mirror() {
    let current = StateStore::new();
    let mut service = Entity::new(EntityKind::Service, gatesync_core::NaturalKey::Name("svc".into()), serde_json::json!({}));
    service.id = Some("S".to_string());
    current.add(service).unwrap();

    let mut route = Entity::new(EntityKind::Route, gatesync_core::NaturalKey::Name("r".into()), serde_json::json!({}));
    route.id = Some("R".to_string());
    route.foreign_refs.push(gatesync_core::ForeignRef {
        kind: EntityKind::Service,
        id_or_name: gatesync_core::IdOrName::Id("S".to_string()),
    });
    current.add(route).unwrap();

    let mut plugin = Entity::new(EntityKind::Plugin, gatesync_core::NaturalKey::None, serde_json::json!({}));
    plugin.id = Some("P".to_string());
    plugin.foreign_refs.push(gatesync_core::ForeignRef {
        kind: EntityKind::Service,
        id_or_name: gatesync_core::IdOrName::Id("S".to_string()),
    });
    current.add(plugin).unwrap();

    let target = StateStore::new();

    let mut registry = KindRegistry::new();
    registry.register(gatesync_kinds::kind_plan(EntityKind::Service, Arc::new(EchoPort)));
    registry.register(gatesync_kinds::kind_plan(EntityKind::Route, Arc::new(EchoPort)));
    registry.register(gatesync_kinds::kind_plan(EntityKind::Plugin, Arc::new(EchoPort)));

    let engine = SyncEngine::new(registry, fast_retry_config(false));
    let current = Arc::new(current);
    let report = engine.run(&current, &Arc::new(target)).await;

    assert_eq!(report.applied_count(), 3);
    assert!(current.get(EntityKind::Service, "S").is_none());
    assert!(current.get(EntityKind::Route, "R").is_none());
    assert!(current.get(EntityKind::Plugin, "P").is_none());
}

/// S6 — 500 retry then success: a create failing twice with HTTP 500
/// still converges to exactly one applied action, and the port sees three
/// total attempts (1 initial + 2 retries).
#[tokio::test]
async fn s6_retries_transient_500_then_succeeds() {
    let target = build_target("services:\n  - name: foo\n");
    let port = Arc::new(FlakyPort {
        attempts: AtomicUsize::new(0),
        fail_times: 2,
    });
    let registry = registry_with(EntityKind::Service, port.clone());
    let engine = SyncEngine::new(registry, fast_retry_config(false));

    let report = engine.run(&Arc::new(StateStore::new()), &Arc::new(target)).await;

    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(port.attempts.load(Ordering::SeqCst), 3);
}

/// Idempotence: reconciling a target that already equals current state
/// emits zero actions.
#[tokio::test]
async fn idempotent_run_emits_nothing_when_target_equals_current() {
    let target = build_target("services:\n  - name: foo\n    host: example.com\n");
    let current = StateStore::new();
    for entity in target.get_all(EntityKind::Service) {
        current.add(entity).unwrap();
    }

    let registry = full_registry_echo();
    let engine = SyncEngine::new(registry, fast_retry_config(false));
    let report = engine.run(&Arc::new(current), &Arc::new(target)).await;

    assert_eq!(report.applied_count(), 0);
    assert_eq!(report.failed_count(), 0);
}

/// partial_apply: a service that exists in current state but is not
/// declared in the document survives the run untouched when partial_apply
/// is on, instead of being diffed as an unwanted delete.
#[tokio::test]
async fn partial_apply_preserves_undeclared_service_end_to_end() {
    let doc: GatewayDocument = serde_yaml::from_str("services:\n  - name: declared\n    host: a.example.com\n").unwrap();

    let current = StateStore::new();
    let mut undeclared = Entity::new(EntityKind::Service, gatesync_core::NaturalKey::Name("undeclared".into()), serde_json::json!({"host": "b.example.com"}));
    undeclared.id = Some("U".to_string());
    current.add(undeclared).unwrap();

    let mut config = BuildConfig::from_document_info(&DocumentInfo::default(), true);
    config.partial_apply = true;
    let built = StateBuilder::new(&doc, &current, &config).build().unwrap();

    assert_eq!(built.raw.get_all(EntityKind::Service).len(), 2);
    assert!(built.raw.get(EntityKind::Service, "U").is_some());

    let registry = full_registry_echo();
    let engine = SyncEngine::new(registry, fast_retry_config(false));
    let current = Arc::new(current);
    let report = engine.run(&current, &Arc::new(built.raw)).await;

    assert_eq!(report.failed_count(), 0);
    assert!(report.actions.iter().all(|a| a.id.as_deref() != Some("U")));
    assert!(current.get(EntityKind::Service, "U").is_some());
}

/// dry_run plans every action but never dispatches it, so the mirror is
/// untouched and the port never observes a call.
#[tokio::test]
async fn dry_run_never_touches_the_port_or_mirror() {
    let target = build_target("services:\n  - name: foo\n");
    let port = Arc::new(FlakyPort {
        attempts: AtomicUsize::new(0),
        fail_times: 0,
    });
    let registry = registry_with(EntityKind::Service, port.clone());
    let engine = SyncEngine::new(registry, fast_retry_config(true));

    let current = Arc::new(StateStore::new());
    let report = engine.run(&current, &Arc::new(target)).await;

    assert_eq!(report.applied_count(), 0);
    assert!(current.is_empty(EntityKind::Service));
    assert_eq!(port.attempts.load(Ordering::SeqCst), 0);
}
