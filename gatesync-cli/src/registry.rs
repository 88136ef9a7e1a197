//! Assembles the process-wide `KindRegistry` for one run: one
//! `HttpEntityPort` per kind sharing a single `reqwest::Client`, wired
//! through `gatesync_kinds::kind_plan` the same way `gatesync-sync`'s own
//! tests do.

use gatesync_core::config::RunConfig;
use gatesync_core::EntityKind;
use gatesync_registry::KindRegistry;
use std::sync::Arc;

pub fn build(config: &RunConfig) -> anyhow::Result<KindRegistry> {
    let client = reqwest::Client::builder().build()?;
    let mut registry = KindRegistry::new();

    for kind in EntityKind::ALL {
        let port = Arc::new(gatesync_client::HttpEntityPort::new(
            client.clone(),
            config.gateway.base_url.clone(),
            config.gateway.api_key.clone(),
            *kind,
        ));
        registry.register(gatesync_kinds::kind_plan(*kind, port));
    }

    Ok(registry)
}
