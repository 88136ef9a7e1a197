//! gatesync binary entry point: `clap::Parser` CLI struct, tracing init,
//! then hand off to `gatesync_sync::SyncEngine`. There is no long-running
//! accept loop — one reconciliation pass runs to completion and the
//! process exits.

mod registry;
mod snapshot;

use clap::Parser;
use gatesync_build::{BuildConfig, StateBuilder};
use gatesync_core::config::RunConfig;
use gatesync_core::document::GatewayDocument;
use gatesync_core::EntityKind;
use gatesync_observability::logging;
use gatesync_store::StateStore;
use gatesync_sync::SyncEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gatesync", version, about = "Declarative state reconciliation for API gateways")]
struct Cli {
    /// Path to the gatesync run config (YAML).
    #[arg(short, long)]
    config: Option<String>,

    /// Path to the declarative document to reconcile toward.
    #[arg(short, long)]
    document: PathBuf,

    /// Path to the on-disk current-state snapshot (read before the run,
    /// rewritten after it). Stands in for a live Gateway query — see
    /// `snapshot.rs`.
    #[arg(long, default_value = "data/gatesync-state.json")]
    state_file: PathBuf,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit structured JSON logs instead of human-readable ones.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.json_logs);

    info!(version = env!("CARGO_PKG_VERSION"), "gatesync starting");

    let config = RunConfig::load(cli.config.as_deref())?;
    info!(
        parallelism = config.parallelism,
        dry_run = config.dry_run,
        gateway = %config.gateway.base_url,
        "run config loaded"
    );

    let doc_text = std::fs::read_to_string(&cli.document)?;
    let doc: GatewayDocument = serde_yaml::from_str(&doc_text)?;
    info!(path = %cli.document.display(), services = doc.services.len(), routes = doc.routes.len(), "document parsed");

    let current = snapshot::load(&cli.state_file);

    let build_config = merge_build_config(&doc, &config);
    let built = StateBuilder::new(&doc, &current, &build_config).build()?;

    let target = StateStore::new();
    for kind in EntityKind::ALL {
        for entity in built.raw.get_all(*kind) {
            target.add_ignoring_duplicates(entity);
        }
        if config.is_konnect {
            for entity in built.konnect_raw.get_all(*kind) {
                target.add_ignoring_duplicates(entity);
            }
        }
    }

    let kind_registry = registry::build(&config)?;
    let engine = SyncEngine::new(kind_registry, config.clone());

    let current = Arc::new(current);
    let target = Arc::new(target);

    // Drain the result channel as actions land rather than waiting for the
    // final report, so a long run surfaces progress as it happens.
    let (results_tx, mut results_rx) = tokio::sync::mpsc::channel(10);
    let drain = tokio::spawn(async move {
        while let Some(action) = results_rx.recv().await {
            info!(op = ?action.op, kind = %action.kind, id = ?action.id, outcome = ?action.outcome, "action");
        }
    });
    let report = engine
        .run_streaming(&current, &target, CancellationToken::new(), results_tx)
        .await;
    let _ = drain.await;

    info!(
        applied = report.applied_count(),
        failed = report.failed_count(),
        "reconciliation pass complete"
    );
    for action in report.actions.iter().filter(|a| a.error.is_some()) {
        warn!(kind = %action.kind, id = ?action.id, error = ?action.error, "action failed");
    }

    if !config.dry_run {
        if let Err(e) = snapshot::save(&current, &cli.state_file) {
            error!(error = %e, "failed to persist current-state snapshot");
        }
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Document-level `_info` flags are the primary source; run-config flags
/// (typically operator-supplied overrides, e.g. forcing `partial_apply` on
/// for one run) are ORed in on top, never subtracted.
fn merge_build_config(doc: &GatewayDocument, config: &RunConfig) -> BuildConfig {
    let mut build_config = BuildConfig::from_document_info(&doc.info, true);
    build_config.include_licenses |= config.include_licenses;
    build_config.is_konnect |= config.is_konnect;
    build_config.skip_ca_certs |= config.skip_ca_certs;
    build_config.partial_apply |= config.partial_apply;
    build_config.consumer_group_policy_overrides |= config.consumer_group_policy_overrides;
    build_config
}
