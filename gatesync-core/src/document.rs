//! The upstream declarative document. The core never parses YAML/JSON
//! itself; `gatesync-cli` decodes a file into `GatewayDocument` via
//! `serde_yaml` and hands the already-parsed value to
//! `gatesync-build::builder::StateBuilder`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayDocument {
    #[serde(default, rename = "_format_version")]
    pub format_version: Option<String>,
    #[serde(default, rename = "_info")]
    pub info: DocumentInfo,
    #[serde(default, rename = "_workspace")]
    pub workspace: Option<String>,
    #[serde(default, rename = "_konnect")]
    pub konnect: Option<KonnectInfo>,

    #[serde(default)]
    pub services: Vec<serde_json::Value>,
    #[serde(default)]
    pub routes: Vec<serde_json::Value>,
    #[serde(default)]
    pub consumers: Vec<serde_json::Value>,
    #[serde(default)]
    pub consumer_groups: Vec<serde_json::Value>,
    #[serde(default)]
    pub plugins: Vec<serde_json::Value>,
    #[serde(default)]
    pub filter_chains: Vec<serde_json::Value>,
    #[serde(default)]
    pub upstreams: Vec<serde_json::Value>,
    #[serde(default)]
    pub certificates: Vec<serde_json::Value>,
    #[serde(default)]
    pub ca_certificates: Vec<serde_json::Value>,
    #[serde(default)]
    pub rbac_roles: Vec<serde_json::Value>,
    #[serde(default)]
    pub service_packages: Vec<serde_json::Value>,
    #[serde(default)]
    pub vaults: Vec<serde_json::Value>,
    #[serde(default)]
    pub licenses: Vec<serde_json::Value>,
    #[serde(default)]
    pub keys: Vec<serde_json::Value>,
    #[serde(default)]
    pub key_sets: Vec<serde_json::Value>,
    #[serde(default)]
    pub partials: Vec<serde_json::Value>,
    #[serde(default)]
    pub custom_entities: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default)]
    pub select_tags: Vec<String>,
    #[serde(default)]
    pub lookup_tags: LookupTags,
    #[serde(default)]
    pub defaults: KindDefaults,
    #[serde(default)]
    pub consumer_group_policy_overrides: bool,
    #[serde(default)]
    pub include_licenses: bool,
    #[serde(default)]
    pub is_konnect: bool,
    #[serde(default)]
    pub skip_ca_certs: bool,
    #[serde(default)]
    pub partial_apply: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupTags {
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default)]
    pub consumers: Vec<String>,
    #[serde(default)]
    pub consumer_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindDefaults {
    #[serde(default)]
    pub service: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub route: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub upstream: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub target: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KonnectInfo {
    pub runtime_group_name: Option<String>,
    pub control_plane_name: Option<String>,
    pub control_plane_id: Option<String>,
}
