//! Run-level Prometheus counters: one row per `(operation, kind, outcome)`
//! plus a retry counter — the counters a batch reconciler actually needs,
//! with no per-HTTP-request histograms since there is no request hot path
//! here to measure.

use gatesync_sync::{ActionOutcome, ActionReport, Op, SyncReport};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

fn op_label(op: Op) -> &'static str {
    match op {
        Op::Create => "create",
        Op::Update => "update",
        Op::Delete => "delete",
    }
}

pub struct RunMetrics {
    registry: Registry,
    actions_total: IntCounterVec,
    retries_total: IntCounterVec,
    errors_total: IntCounterVec,
}

impl RunMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let actions_total = IntCounterVec::new(
            Opts::new("gatesync_actions_total", "Reconcile actions dispatched, by op/kind/outcome")
                .namespace("gatesync"),
            &["op", "kind", "outcome"],
        )?;
        let retries_total = IntCounterVec::new(
            Opts::new("gatesync_retries_total", "CRUD retries attempted, by kind")
                .namespace("gatesync"),
            &["kind"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new("gatesync_errors_total", "Permanent errors surfaced, by kind")
                .namespace("gatesync"),
            &["kind"],
        )?;

        registry.register(Box::new(actions_total.clone()))?;
        registry.register(Box::new(retries_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;

        Ok(Self {
            registry,
            actions_total,
            retries_total,
            errors_total,
        })
    }

    /// Records every action in a finished run's report. Retry counts aren't
    /// visible on `ActionReport` (the engine only reports the terminal
    /// outcome), so `retries_total` is driven separately by the caller from
    /// the engine's own retry-attempt events where available.
    pub fn record_report(&self, report: &SyncReport) {
        for action in &report.actions {
            self.record_action(action);
        }
    }

    pub fn record_action(&self, action: &ActionReport) {
        let outcome = match action.outcome {
            ActionOutcome::Planned => "planned",
            ActionOutcome::Applied => "applied",
            ActionOutcome::Failed => "failed",
            ActionOutcome::Cancelled => "cancelled",
        };
        self.actions_total
            .with_label_values(&[op_label(action.op), action.kind.to_string().as_str(), outcome])
            .inc();
        if action.outcome == ActionOutcome::Failed {
            self.errors_total.with_label_values(&[action.kind.to_string().as_str()]).inc();
        }
    }

    pub fn record_retry(&self, kind: &str) {
        self.retries_total.with_label_values(&[kind]).inc();
    }

    /// Prometheus text exposition, served by the binary crate's `/metrics`
    /// endpoint if one is wired up (peripheral — no HTTP server lives here).
    pub fn gather_text(&self) -> String {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer).unwrap_or_default();
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new().expect("failed to construct RunMetrics registry")
    }
}
