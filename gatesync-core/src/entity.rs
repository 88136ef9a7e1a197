use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of entity kinds a gateway document may declare.
///
/// Ordering here is declaration order, used as the tie-break when two kinds
/// share a dependency level (`gatesync-registry::registry::KindRegistry`
/// sorts by level first, then by the position a variant appears in this
/// enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Certificate,
    Sni,
    CaCertificate,
    ServicePackage,
    ServiceVersion,
    Document,
    Service,
    Route,
    Consumer,
    ConsumerGroup,
    ConsumerGroupConsumer,
    ConsumerGroupPlugin,
    Plugin,
    FilterChain,
    Upstream,
    Target,
    KeyAuth,
    BasicAuth,
    HmacAuth,
    JwtAuth,
    Oauth2Credential,
    AclGroup,
    MtlsAuth,
    Vault,
    Key,
    KeySet,
    Partial,
    CustomEntity,
    RbacRole,
    RbacEndpointPermission,
    License,
}

impl EntityKind {
    /// All kinds in declaration order, used to seed the registry and for
    /// stable tie-breaks within a dependency level.
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Certificate,
        EntityKind::Sni,
        EntityKind::CaCertificate,
        EntityKind::ServicePackage,
        EntityKind::ServiceVersion,
        EntityKind::Document,
        EntityKind::Service,
        EntityKind::Route,
        EntityKind::Consumer,
        EntityKind::ConsumerGroup,
        EntityKind::ConsumerGroupConsumer,
        EntityKind::ConsumerGroupPlugin,
        EntityKind::Plugin,
        EntityKind::FilterChain,
        EntityKind::Upstream,
        EntityKind::Target,
        EntityKind::KeyAuth,
        EntityKind::BasicAuth,
        EntityKind::HmacAuth,
        EntityKind::JwtAuth,
        EntityKind::Oauth2Credential,
        EntityKind::AclGroup,
        EntityKind::MtlsAuth,
        EntityKind::Vault,
        EntityKind::Key,
        EntityKind::KeySet,
        EntityKind::Partial,
        EntityKind::CustomEntity,
        EntityKind::RbacRole,
        EntityKind::RbacEndpointPermission,
        EntityKind::License,
    ];

    /// True for kinds whose natural key can collide across distinct ids,
    /// i.e. kinds the differ must run `DuplicatesDeletes` for.
    pub fn supports_duplicate_delete(self) -> bool {
        matches!(
            self,
            EntityKind::Service
                | EntityKind::Route
                | EntityKind::Consumer
                | EntityKind::ConsumerGroup
                | EntityKind::Upstream
                | EntityKind::Certificate
                | EntityKind::CaCertificate
        )
    }

    /// True for kinds whose delete cascades to dependent child kinds in the
    /// current-state mirror.
    pub fn cascades_on_delete(self) -> bool {
        matches!(self, EntityKind::Service | EntityKind::Route | EntityKind::Consumer)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_else(|| "unknown".to_string());
        write!(f, "{s}")
    }
}

/// The natural-key shape varies per kind: `name`, `prefix`, `username`,
/// `key`, `group`, `(uri, query)`, plus the common "no natural key" case
/// for kinds identified only by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NaturalKey {
    Name(String),
    Prefix(String),
    Username(String),
    Key(String),
    Group(String),
    UriQuery(String, Option<String>),
    CertKey(String, String),
    /// No natural key; identity is the `id` alone (targets, most credentials).
    None,
}

impl NaturalKey {
    pub fn as_lookup_string(&self) -> Option<String> {
        match self {
            NaturalKey::Name(s)
            | NaturalKey::Prefix(s)
            | NaturalKey::Username(s)
            | NaturalKey::Key(s)
            | NaturalKey::Group(s) => Some(s.clone()),
            NaturalKey::UriQuery(uri, query) => {
                Some(format!("{uri}|{}", query.as_deref().unwrap_or("")))
            }
            NaturalKey::CertKey(cert, key) => Some(format!("{cert}|{key}")),
            NaturalKey::None => None,
        }
    }
}

/// A foreign reference to a parent entity, resolved by id once the builder's
/// cross-kind wiring step completes. Before resolution it may carry only a
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignRef {
    pub kind: EntityKind,
    pub id_or_name: IdOrName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrName {
    Id(String),
    Name(String),
}

impl IdOrName {
    pub fn as_id(&self) -> Option<&str> {
        match self {
            IdOrName::Id(s) => Some(s),
            IdOrName::Name(_) => None,
        }
    }
}

/// Read-only metadata, excluded from equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

/// The generic entity envelope. One struct covers every kind in
/// `EntityKind`; kind-specific shape lives in `attrs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: Option<String>,
    pub natural_key: NaturalKey,
    /// Opaque configuration map — everything that isn't identity, tags, or
    /// foreign refs lives here, keyed exactly as the declarative document
    /// names it.
    pub attrs: serde_json::Value,
    pub tags: Vec<String>,
    pub foreign_refs: Vec<ForeignRef>,
    #[serde(default)]
    pub timestamps: Timestamps,
    /// Set by the builder when the declaration carried an explicit id; the
    /// differ uses this to distinguish a synthesized id from a
    /// caller-declared one for identity-collision detection.
    #[serde(default)]
    pub id_declared: bool,
}

impl Entity {
    pub fn new(kind: EntityKind, natural_key: NaturalKey, attrs: serde_json::Value) -> Self {
        Self {
            kind,
            id: None,
            natural_key,
            attrs,
            tags: Vec::new(),
            foreign_refs: Vec::new(),
            timestamps: Timestamps::default(),
            id_declared: false,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Equality ignoring timestamps and, for kinds that need it, ignoring
    /// foreign-reference name fields.
    pub fn equals_ignoring_timestamps_and_fk_names(&self, other: &Entity) -> bool {
        if self.kind != other.kind || self.id != other.id || self.attrs != other.attrs {
            return false;
        }
        if self.tags != other.tags {
            return false;
        }
        let self_ids: Vec<Option<&str>> = self
            .foreign_refs
            .iter()
            .map(|r| r.id_or_name.as_id())
            .collect();
        let other_ids: Vec<Option<&str>> = other
            .foreign_refs
            .iter()
            .map(|r| r.id_or_name.as_id())
            .collect();
        self_ids == other_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_list_matches_variant_count() {
        // Every variant added to EntityKind must be added to ALL, or the
        // registry silently drops it from topological ordering.
        assert_eq!(EntityKind::ALL.len(), 31);
    }

    #[test]
    fn duplicate_delete_kinds_are_named_kinds() {
        assert!(EntityKind::Service.supports_duplicate_delete());
        assert!(EntityKind::Route.supports_duplicate_delete());
        assert!(!EntityKind::Target.supports_duplicate_delete());
    }

    #[test]
    fn cascade_kinds_are_service_route_and_consumer() {
        assert!(EntityKind::Service.cascades_on_delete());
        assert!(EntityKind::Route.cascades_on_delete());
        assert!(EntityKind::Consumer.cascades_on_delete());
        assert!(!EntityKind::Plugin.cascades_on_delete());
    }

    #[test]
    fn equality_ignores_timestamps() {
        let mut a = Entity::new(
            EntityKind::Service,
            NaturalKey::Name("foo".into()),
            serde_json::json!({"protocol": "http"}),
        );
        a.id = Some("A".into());
        let mut b = a.clone();
        b.timestamps = Timestamps {
            created_at: Some(1),
            updated_at: Some(2),
        };
        assert!(a.equals_ignoring_timestamps_and_fk_names(&b));
    }

    #[test]
    fn equality_catches_attr_change() {
        let mut a = Entity::new(
            EntityKind::Service,
            NaturalKey::Name("foo".into()),
            serde_json::json!({"read_timeout": 60000}),
        );
        a.id = Some("A".into());
        let mut b = a.clone();
        b.attrs = serde_json::json!({"read_timeout": 30000});
        assert!(!a.equals_ignoring_timestamps_and_fk_names(&b));
    }

    #[test]
    fn foreign_ref_name_ignored_when_id_present() {
        let mut a = Entity::new(EntityKind::Route, NaturalKey::Name("r".into()), serde_json::json!({}));
        a.foreign_refs.push(ForeignRef {
            kind: EntityKind::Service,
            id_or_name: IdOrName::Id("svc-1".into()),
        });
        let mut b = a.clone();
        // Same id, different accompanying name — must still compare equal.
        b.foreign_refs[0].id_or_name = IdOrName::Id("svc-1".into());
        assert!(a.equals_ignoring_timestamps_and_fk_names(&b));
    }
}
