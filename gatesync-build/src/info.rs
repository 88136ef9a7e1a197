//! Build-time configuration. Most fields mirror
//! `gatesync_core::document::DocumentInfo`; the builder also needs a couple
//! of gateway-capability flags that do not belong in the declarative
//! document itself (they come from the target gateway's reported version).

use gatesync_core::document::{KindDefaults, LookupTags};

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub select_tags: Vec<String>,
    pub lookup_tags: LookupTags,
    pub defaults: KindDefaults,
    pub consumer_group_policy_overrides: bool,
    pub include_licenses: bool,
    pub is_konnect: bool,
    pub skip_ca_certs: bool,
    pub partial_apply: bool,
    /// True when the target gateway understands expression-based routing
    /// (affects how routes are normalized).
    pub gateway_supports_expressions: bool,
    /// True when the target gateway supports consumer-group-scoped plugins
    /// as the policy-override mechanism for rate-limiting-advanced (the
    /// "current" form in spec §4.3 step 7, vs. the legacy
    /// `consumer_groups`/`enforce_consumer_groups` plugin fields).
    pub gateway_supports_consumer_group_scoped_plugins: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            select_tags: Vec::new(),
            lookup_tags: LookupTags::default(),
            defaults: KindDefaults::default(),
            consumer_group_policy_overrides: false,
            include_licenses: false,
            is_konnect: false,
            skip_ca_certs: false,
            partial_apply: false,
            gateway_supports_expressions: true,
            gateway_supports_consumer_group_scoped_plugins: true,
        }
    }
}

impl BuildConfig {
    pub fn from_document_info(info: &gatesync_core::document::DocumentInfo, gateway_supports_expressions: bool) -> Self {
        Self {
            select_tags: info.select_tags.clone(),
            lookup_tags: info.lookup_tags.clone(),
            defaults: info.defaults.clone(),
            consumer_group_policy_overrides: info.consumer_group_policy_overrides,
            include_licenses: info.include_licenses,
            is_konnect: info.is_konnect,
            skip_ca_certs: info.skip_ca_certs,
            partial_apply: info.partial_apply,
            gateway_supports_expressions,
            gateway_supports_consumer_group_scoped_plugins: true,
        }
    }
}
