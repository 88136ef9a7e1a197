//! State builder: turns a declarative `GatewayDocument` plus the
//! current-state mirror into normalized target state, ready for the differ.
//! Walks one decode → default-fill → index pipeline across every kind via
//! the same per-kind tables `gatesync-kinds` already uses for diffing.

use crate::error::BuildError;
use crate::info::BuildConfig;
use crate::natural_key;
use gatesync_core::document::GatewayDocument;
use gatesync_core::tag::TagMerger;
use gatesync_core::{Entity, EntityKind, ForeignRef, IdOrName, NaturalKey};
use gatesync_kinds::normalize;
use gatesync_registry::dependency_level;
use gatesync_store::StateStore;
use serde_json::{Map, Value};
use uuid::Uuid;

/// The output of a build: two independent stores, split by whether a kind is
/// a Konnect control-plane-only concept. Kinds that are not control-plane-only
/// always land in `raw`; control-plane-only kinds always land in
/// `konnect_raw`, irrespective of `BuildConfig::is_konnect` — a deliberate
/// simplification recorded in DESIGN.md.
pub struct BuiltState {
    pub raw: StateStore,
    pub konnect_raw: StateStore,
}

/// Kinds that only exist in a Konnect control plane, never on a bare
/// gateway node.
fn is_konnect_only(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Vault
            | EntityKind::Key
            | EntityKind::KeySet
            | EntityKind::Partial
            | EntityKind::RbacRole
            | EntityKind::RbacEndpointPermission
            | EntityKind::License
    )
}

/// JSON key and child kind for entities nested inside a parent's own
/// declaration.
fn nested_children(kind: EntityKind) -> &'static [(&'static str, EntityKind)] {
    use EntityKind::*;
    match kind {
        Service => &[("routes", Route), ("plugins", Plugin)],
        Route => &[("plugins", Plugin)],
        Consumer => &[
            ("keyauth_credentials", KeyAuth),
            ("basicauth_credentials", BasicAuth),
            ("hmacauth_credentials", HmacAuth),
            ("jwt_secrets", JwtAuth),
            ("oauth2_credentials", Oauth2Credential),
            ("acls", AclGroup),
            ("mtls_auth", MtlsAuth),
            ("plugins", Plugin),
        ],
        ConsumerGroup => &[("plugins", Plugin)],
        Upstream => &[("targets", Target)],
        RbacRole => &[("endpoint_permissions", RbacEndpointPermission)],
        _ => &[],
    }
}

/// Fields that carry a declared foreign reference to another top-level kind,
/// resolved at build time from either an embedded id or a name looked up in
/// the partially-built store.
fn declared_ref_fields(kind: EntityKind) -> &'static [(&'static str, EntityKind)] {
    use EntityKind::*;
    match kind {
        Route => &[("service", Service)],
        Plugin => &[
            ("service", Service),
            ("route", Route),
            ("consumer", Consumer),
            ("consumer_group", ConsumerGroup),
        ],
        Target => &[("upstream", Upstream)],
        ConsumerGroupConsumer => &[("consumer_group", ConsumerGroup), ("consumer", Consumer)],
        ConsumerGroupPlugin => &[("consumer_group", ConsumerGroup)],
        Sni => &[("certificate", Certificate)],
        ServiceVersion => &[("service_package", ServicePackage)],
        KeyAuth | BasicAuth | HmacAuth | JwtAuth | Oauth2Credential | AclGroup | MtlsAuth => {
            &[("consumer", Consumer)]
        }
        _ => &[],
    }
}

/// Top-level document arrays in dependency order, so a by-name foreign-ref
/// lookup always finds its parent already inserted.
fn top_level_kinds() -> Vec<EntityKind> {
    let mut kinds: Vec<EntityKind> = EntityKind::ALL.to_vec();
    kinds.sort_by_key(|k| dependency_level(*k));
    kinds
}

/// Every plugin declaration in the document, top-level or nested under a
/// service/route/consumer/consumer-group, for the step-7 policy scan. Does
/// not resolve ids or defaults — this runs before any entity is built.
fn all_plugin_values(doc: &GatewayDocument) -> Vec<&Value> {
    let mut out: Vec<&Value> = doc.plugins.iter().collect();
    let nested_parents = [&doc.services, &doc.routes, &doc.consumers, &doc.consumer_groups];
    for parent_items in nested_parents {
        for parent in parent_items {
            if let Some(nested) = parent.get("plugins").and_then(Value::as_array) {
                out.extend(nested.iter());
            }
        }
    }
    out
}

/// True if `plugin` is a `rate-limiting-advanced` declaration carrying the
/// legacy `consumer_groups` array or `enforce_consumer_groups` flag.
fn is_legacy_rate_limiting_advanced(plugin: &Value) -> bool {
    if plugin.get("name").and_then(Value::as_str) != Some("rate-limiting-advanced") {
        return false;
    }
    let field_set = |field: &str| -> bool {
        [plugin.get("config"), Some(plugin)].into_iter().flatten().any(|src| match field {
            "consumer_groups" => src.get(field).and_then(Value::as_array).is_some_and(|a| !a.is_empty()),
            "enforce_consumer_groups" => src.get(field).and_then(Value::as_bool).unwrap_or(false),
            _ => false,
        })
    };
    field_set("consumer_groups") || field_set("enforce_consumer_groups")
}

fn top_level_items<'a>(doc: &'a GatewayDocument, kind: EntityKind) -> &'a [Value] {
    use EntityKind::*;
    match kind {
        Service => &doc.services,
        Route => &doc.routes,
        Consumer => &doc.consumers,
        ConsumerGroup => &doc.consumer_groups,
        Plugin => &doc.plugins,
        FilterChain => &doc.filter_chains,
        Upstream => &doc.upstreams,
        Certificate => &doc.certificates,
        CaCertificate => &doc.ca_certificates,
        RbacRole => &doc.rbac_roles,
        ServicePackage => &doc.service_packages,
        Vault => &doc.vaults,
        License => &doc.licenses,
        Key => &doc.keys,
        KeySet => &doc.key_sets,
        Partial => &doc.partials,
        CustomEntity => &doc.custom_entities,
        _ => &[],
    }
}

/// Kinds step 8 pre-loads from current state when `partial_apply` is set,
/// so the declaration may omit them without orphaning the live entity.
const PARTIAL_APPLY_KINDS: &[EntityKind] = &[
    EntityKind::Service,
    EntityKind::Route,
    EntityKind::Consumer,
    EntityKind::ConsumerGroup,
    EntityKind::Certificate,
    EntityKind::CaCertificate,
];

pub struct StateBuilder<'a> {
    doc: &'a GatewayDocument,
    current: &'a StateStore,
    config: &'a BuildConfig,
    /// `(kind, id)` pairs pre-loaded by `hydrate_partial_apply`. A
    /// declaration that resolves to one of these ids overwrites the
    /// hydrated placeholder instead of being silently dropped by
    /// `add_ignoring_duplicates`.
    hydrated: std::cell::RefCell<std::collections::HashSet<(EntityKind, String)>>,
}

impl<'a> StateBuilder<'a> {
    pub fn new(doc: &'a GatewayDocument, current: &'a StateStore, config: &'a BuildConfig) -> Self {
        Self {
            doc,
            current,
            config,
            hydrated: std::cell::RefCell::new(std::collections::HashSet::new()),
        }
    }

    /// Step 8 (partial-apply hydration): pre-load current-state entities of
    /// the kinds in `PARTIAL_APPLY_KINDS` into `raw` so the declaration may
    /// reference them by name without redeclaring them. A later
    /// declaration for the same id overwrites the hydrated copy (see
    /// `hydrated`); an omitted one survives untouched through to the
    /// differ, which sees it as an ordinary current-state entry (spec §9
    /// open question (a)).
    fn hydrate_partial_apply(&self, raw: &StateStore) {
        for kind in PARTIAL_APPLY_KINDS {
            for entity in self.current.get_all(*kind) {
                let Some(id) = entity.id.clone() else { continue };
                raw.add_ignoring_duplicates(entity);
                self.hydrated.borrow_mut().insert((*kind, id));
            }
        }
    }

    /// Step 7: reject a rate-limiting-advanced declaration that sets the
    /// legacy `consumer_groups`/`enforce_consumer_groups` fields while the
    /// target gateway version also supports consumer-group-scoped plugins,
    /// unless the run explicitly opts into the legacy form via
    /// `consumer_group_policy_overrides` (which disables the scoped-plugin
    /// check for this run).
    fn validate_consumer_group_policy(&self) -> Result<(), BuildError> {
        if self.config.consumer_group_policy_overrides
            || !self.config.gateway_supports_consumer_group_scoped_plugins
        {
            return Ok(());
        }

        let has_legacy_policy = all_plugin_values(self.doc).iter().any(|p| is_legacy_rate_limiting_advanced(p));
        if has_legacy_policy {
            return Err(BuildError::ConsumerGroupPolicyConflict);
        }
        Ok(())
    }

    pub fn build(&self) -> Result<BuiltState, BuildError> {
        self.validate_consumer_group_policy()?;

        let raw = StateStore::new();
        let konnect_raw = StateStore::new();

        if self.config.partial_apply {
            self.hydrate_partial_apply(&raw);
        }

        for kind in top_level_kinds() {
            if kind == EntityKind::CaCertificate && self.config.skip_ca_certs {
                continue;
            }
            if kind == EntityKind::License && !self.config.include_licenses {
                continue;
            }
            for item in top_level_items(self.doc, kind) {
                self.build_entity(kind, item, None, &raw, &konnect_raw)?;
            }
        }

        Ok(BuiltState { raw, konnect_raw })
    }

    fn target_store<'s>(&self, kind: EntityKind, raw: &'s StateStore, konnect_raw: &'s StateStore) -> &'s StateStore {
        if is_konnect_only(kind) {
            konnect_raw
        } else {
            raw
        }
    }

    fn build_entity(
        &self,
        kind: EntityKind,
        value: &Value,
        parent: Option<(EntityKind, String)>,
        raw: &StateStore,
        konnect_raw: &StateStore,
    ) -> Result<String, BuildError> {
        let mut attrs = value.clone();
        if !attrs.is_object() {
            attrs = Value::Object(Map::new());
        }

        let nested = take_nested_children(kind, &mut attrs);
        let declared_tags = take_tags(&mut attrs);
        let declared_id = take_string_field(&mut attrs, "id");

        let natural_key = natural_key::extract(kind, &attrs);

        let resolved_id = declared_id.clone().or_else(|| {
            if natural_key == NaturalKey::None {
                None
            } else {
                self.current
                    .get_by_natural_key(kind, &natural_key)
                    .and_then(|e| e.id)
            }
        });
        let id = resolved_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let lookup_tags = lookup_tags_for(kind, self.config);
        let merger = TagMerger::new(self.config.select_tags.clone());
        let tags = merger.merge(declared_tags, lookup_tags);

        apply_kind_defaults(kind, &mut attrs, self.config);

        match kind {
            EntityKind::Service => normalize::normalize_service(&mut attrs),
            EntityKind::Route => {
                normalize::normalize_route(&mut attrs, self.config.gateway_supports_expressions)?
            }
            EntityKind::Target => {
                if let Some(Value::String(target)) = attrs.get("target").cloned() {
                    if let Value::Object(map) = &mut attrs {
                        map.insert(
                            "target".to_string(),
                            Value::String(normalize::normalize_target_address(&target)),
                        );
                    }
                }
            }
            _ => {}
        }

        let mut foreign_refs = Vec::new();
        if let Some((parent_kind, parent_id)) = &parent {
            foreign_refs.push(ForeignRef {
                kind: *parent_kind,
                id_or_name: IdOrName::Id(parent_id.clone()),
            });
        }
        for (field, ref_kind) in declared_ref_fields(kind) {
            if let Some(r) = self.resolve_declared_ref(kind, &mut attrs, field, *ref_kind, raw, konnect_raw)? {
                foreign_refs.push(r);
            }
        }

        if kind == EntityKind::Plugin {
            let scopes = foreign_refs
                .iter()
                .filter(|r| {
                    matches!(
                        r.kind,
                        EntityKind::Service | EntityKind::Route | EntityKind::Consumer | EntityKind::ConsumerGroup
                    )
                })
                .count();
            if scopes > 1 {
                return Err(BuildError::PluginScopeConflict { kind });
            }
        }

        let mut entity = Entity::new(kind, natural_key, attrs);
        entity.id = Some(id.clone());
        entity.id_declared = declared_id.is_some();
        entity.tags = tags;
        entity.foreign_refs = foreign_refs;

        let store = self.target_store(kind, raw, konnect_raw);
        if self.hydrated.borrow_mut().remove(&(kind, id.clone())) {
            // Redeclares a hydrated partial-apply placeholder: the
            // declared/normalized entity wins over the bare current-state
            // copy loaded by `hydrate_partial_apply`.
            let _ = store.update(entity);
        } else {
            store.add_ignoring_duplicates(entity);
        }

        for (_field, child_kind, child_value) in nested {
            self.build_entity(child_kind, &child_value, Some((kind, id.clone())), raw, konnect_raw)?;
        }

        Ok(id)
    }

    fn resolve_declared_ref(
        &self,
        kind: EntityKind,
        attrs: &mut Value,
        field: &str,
        ref_kind: EntityKind,
        raw: &StateStore,
        konnect_raw: &StateStore,
    ) -> Result<Option<ForeignRef>, BuildError> {
        let Value::Object(map) = attrs else { return Ok(None) };
        let Some(declared) = map.remove(field) else {
            return Ok(None);
        };

        let (id, name) = match &declared {
            Value::Object(o) => (
                o.get("id").and_then(Value::as_str).map(str::to_string),
                o.get("name").and_then(Value::as_str).map(str::to_string),
            ),
            Value::String(s) => (Some(s.clone()), None),
            _ => (None, None),
        };

        if let Some(id) = id {
            return Ok(Some(ForeignRef {
                kind: ref_kind,
                id_or_name: IdOrName::Id(id),
            }));
        }

        if let Some(name) = name {
            let store = self.target_store(ref_kind, raw, konnect_raw);
            if let Some(found) = store.get_by_natural_key(ref_kind, &NaturalKey::Name(name.clone())) {
                if let Some(found_id) = found.id {
                    return Ok(Some(ForeignRef {
                        kind: ref_kind,
                        id_or_name: IdOrName::Id(found_id),
                    }));
                }
            }
            return Err(BuildError::UnresolvedReference {
                kind,
                field: field.to_string(),
                ref_kind,
                reference: name,
            });
        }

        Ok(None)
    }
}

fn take_nested_children(kind: EntityKind, attrs: &mut Value) -> Vec<(&'static str, EntityKind, Value)> {
    let Value::Object(map) = attrs else { return Vec::new() };
    let mut out = Vec::new();
    for (field, child_kind) in nested_children(kind) {
        if let Some(Value::Array(items)) = map.remove(*field) {
            for item in items {
                out.push((*field, *child_kind, item));
            }
        }
    }
    out
}

fn take_tags(attrs: &mut Value) -> Vec<String> {
    let Value::Object(map) = attrs else { return Vec::new() };
    match map.remove("tags") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn take_string_field(attrs: &mut Value, field: &str) -> Option<String> {
    let Value::Object(map) = attrs else { return None };
    map.remove(field).and_then(|v| v.as_str().map(str::to_string))
}

fn lookup_tags_for(kind: EntityKind, config: &BuildConfig) -> &[String] {
    use EntityKind::*;
    match kind {
        Service => &config.lookup_tags.services,
        Route => &config.lookup_tags.routes,
        Consumer => &config.lookup_tags.consumers,
        ConsumerGroup => &config.lookup_tags.consumer_groups,
        _ => &[],
    }
}

fn apply_kind_defaults(kind: EntityKind, attrs: &mut Value, config: &BuildConfig) {
    let defaults = match kind {
        EntityKind::Service => &config.defaults.service,
        EntityKind::Route => &config.defaults.route,
        EntityKind::Upstream => &config.defaults.upstream,
        EntityKind::Target => &config.defaults.target,
        _ => return,
    };
    if defaults.is_empty() {
        return;
    }
    if let Value::Object(map) = attrs {
        for (k, v) in defaults {
            map.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesync_core::document::DocumentInfo;

    fn config() -> BuildConfig {
        BuildConfig::from_document_info(&DocumentInfo::default(), true)
    }

    #[test]
    fn s1_service_gets_id_and_defaults() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
services:
  - name: foo
    host: example.com
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();

        let svcs = built.raw.get_all(EntityKind::Service);
        assert_eq!(svcs.len(), 1);
        assert!(svcs[0].id.is_some());
        assert_eq!(svcs[0].attrs["protocol"], "http");
        assert_eq!(svcs[0].attrs["read_timeout"], 60000);
    }

    #[test]
    fn s2_build_reuses_id_for_existing_name() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
services:
  - name: foo
    host: example.com
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let mut existing = Entity::new(EntityKind::Service, NaturalKey::Name("foo".to_string()), serde_json::json!({}));
        existing.id = Some("existing-id".to_string());
        current.add(existing).unwrap();

        let cfg = config();
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();
        let svcs = built.raw.get_all(EntityKind::Service);
        assert_eq!(svcs[0].id.as_deref(), Some("existing-id"));
    }

    #[test]
    fn s3_strip_path_conflict_surfaces_as_build_error() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
services:
  - name: foo
    routes:
      - name: r1
        protocols: ["tcp"]
        strip_path: true
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let err = StateBuilder::new(&doc, &current, &cfg).build().unwrap_err();
        assert!(matches!(err, BuildError::Core(_)));
    }

    #[test]
    fn nested_route_carries_foreign_ref_to_parent_service() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
services:
  - name: foo
    routes:
      - name: r1
        protocols: ["http"]
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();

        let svc_id = built.raw.get_all(EntityKind::Service)[0].id.clone().unwrap();
        let routes = built.raw.get_all(EntityKind::Route);
        assert_eq!(routes.len(), 1);
        assert!(routes[0]
            .foreign_refs
            .iter()
            .any(|r| r.kind == EntityKind::Service && r.id_or_name == IdOrName::Id(svc_id.clone())));
    }

    #[test]
    fn plugin_scoped_to_both_consumer_and_consumer_group_is_rejected() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
consumers:
  - username: alice
consumer_groups:
  - name: g1
plugins:
  - name: rate-limiting
    consumer: { name: alice }
    consumer_group: { name: g1 }
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let err = StateBuilder::new(&doc, &current, &cfg).build().unwrap_err();
        assert!(matches!(err, BuildError::PluginScopeConflict { .. }));
    }

    #[test]
    fn plugin_scoped_to_both_service_and_route_is_rejected() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
services:
  - name: foo
routes:
  - name: r1
    protocols: ["http"]
plugins:
  - name: rate-limiting
    service: { name: foo }
    route: { name: r1 }
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let err = StateBuilder::new(&doc, &current, &cfg).build().unwrap_err();
        assert!(matches!(err, BuildError::PluginScopeConflict { .. }));
    }

    #[test]
    fn declared_id_is_preserved_and_marked_declared() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
services:
  - id: "11111111-1111-1111-1111-111111111111"
    name: foo
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();
        let svc = &built.raw.get_all(EntityKind::Service)[0];
        assert_eq!(svc.id.as_deref(), Some("11111111-1111-1111-1111-111111111111"));
        assert!(svc.id_declared);
    }

    #[test]
    fn skip_ca_certs_flag_drops_ca_certificate_entities() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
ca_certificates:
  - cert: "CERT"
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let mut cfg = config();
        cfg.skip_ca_certs = true;
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();
        assert!(built.raw.is_empty(EntityKind::CaCertificate));
    }

    #[test]
    fn control_plane_only_kinds_land_in_konnect_store() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
vaults:
  - name: env-vault
    prefix: env
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();
        assert!(built.raw.is_empty(EntityKind::Vault));
        assert_eq!(built.konnect_raw.get_all(EntityKind::Vault).len(), 1);
    }

    #[test]
    fn partial_apply_hydrates_undeclared_service_from_current_state() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
routes:
  - name: r1
    service: { name: foo }
    protocols: ["http"]
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let mut existing = Entity::new(EntityKind::Service, NaturalKey::Name("foo".to_string()), serde_json::json!({"protocol": "http"}));
        existing.id = Some("existing-svc".to_string());
        current.add(existing).unwrap();

        let mut cfg = config();
        cfg.partial_apply = true;
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();

        // The service was never redeclared, but the route's by-name
        // reference still resolves because step 8 hydrated it into raw.
        let routes = built.raw.get_all(EntityKind::Route);
        assert_eq!(routes.len(), 1);
        assert!(routes[0]
            .foreign_refs
            .iter()
            .any(|r| r.kind == EntityKind::Service && r.id_or_name == IdOrName::Id("existing-svc".to_string())));
        let svcs = built.raw.get_all(EntityKind::Service);
        assert_eq!(svcs.len(), 1);
        assert_eq!(svcs[0].id.as_deref(), Some("existing-svc"));
    }

    #[test]
    fn partial_apply_redeclaration_overwrites_hydrated_copy() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
services:
  - name: foo
    read_timeout: 30000
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let mut existing = Entity::new(EntityKind::Service, NaturalKey::Name("foo".to_string()), serde_json::json!({"read_timeout": 60000}));
        existing.id = Some("existing-svc".to_string());
        current.add(existing).unwrap();

        let mut cfg = config();
        cfg.partial_apply = true;
        let built = StateBuilder::new(&doc, &current, &cfg).build().unwrap();

        let svcs = built.raw.get_all(EntityKind::Service);
        assert_eq!(svcs.len(), 1);
        assert_eq!(svcs[0].id.as_deref(), Some("existing-svc"));
        assert_eq!(svcs[0].attrs["read_timeout"], 30000);
    }

    #[test]
    fn legacy_rate_limiting_advanced_conflicts_with_scoped_plugin_support() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
plugins:
  - name: rate-limiting-advanced
    config:
      enforce_consumer_groups: true
      consumer_groups: ["gold"]
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let cfg = config();
        let err = StateBuilder::new(&doc, &current, &cfg).build().unwrap_err();
        assert!(matches!(err, BuildError::ConsumerGroupPolicyConflict));
    }

    #[test]
    fn consumer_group_policy_overrides_permits_legacy_form() {
        let doc: GatewayDocument = serde_yaml::from_str(
            r#"
plugins:
  - name: rate-limiting-advanced
    config:
      enforce_consumer_groups: true
      consumer_groups: ["gold"]
"#,
        )
        .unwrap();
        let current = StateStore::new();
        let mut cfg = config();
        cfg.consumer_group_policy_overrides = true;
        let built = StateBuilder::new(&doc, &current, &cfg).build();
        assert!(built.is_ok());
    }
}
