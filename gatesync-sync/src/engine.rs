//! Sync engine: walks the registry's dependency levels, diffing and
//! dispatching one level at a time. Dispatch within a level runs on a
//! bounded worker pool; levels themselves are a hard barrier, since a
//! child kind's create may reference a parent id only the previous level's
//! dispatch has assigned. The worker pool is an mpsc-channel-plus-task
//! idiom generalized from one writer task into a pool of `parallelism`
//! workers pulling off a shared channel.

use crate::report::{ActionReport, SyncReport};
use crate::retry::RetryPolicy;
use gatesync_core::config::RunConfig;
use gatesync_core::{CoreError, Event, Op};
use gatesync_registry::{EntityPort, KindRegistry, PortError, PostProcessor};
use gatesync_store::{SchemaCache, StateStore};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

pub struct SyncEngine {
    registry: KindRegistry,
    config: RunConfig,
    schema_cache: SchemaCache,
}

impl SyncEngine {
    pub fn new(registry: KindRegistry, config: RunConfig) -> Self {
        Self {
            registry,
            config,
            schema_cache: SchemaCache::new(),
        }
    }

    /// Runs one full reconciliation pass: duplicate-deletes, then
    /// creates/updates forward by level, then deletes reverse by level.
    /// `current` is mutated in place by each kind's post-processor as
    /// operations succeed; `target` is read-only. Both are `Arc`-wrapped so
    /// dispatch workers can hold their own handle without borrowing across
    /// a `tokio::spawn` boundary.
    pub async fn run(&self, current: &Arc<StateStore>, target: &Arc<StateStore>) -> SyncReport {
        self.run_cancellable(current, target, CancellationToken::new()).await
    }

    pub async fn run_cancellable(
        &self,
        current: &Arc<StateStore>,
        target: &Arc<StateStore>,
        cancel: CancellationToken,
    ) -> SyncReport {
        self.run_inner(current, target, cancel, None).await
    }

    /// Streams one `ActionReport` per dispatched event onto `results` as the
    /// run progresses, in addition to returning the full `SyncReport` at the
    /// end — the C7 reporting surface external reporters consume live. The
    /// channel is only created (and only ever sent to) when
    /// `RunConfig::emit_actions` is true; callers that set it MUST keep
    /// draining `results` or a full channel makes workers block on send,
    /// stalling the run, exactly as spec'd for `emit_actions`.
    pub async fn run_streaming(
        &self,
        current: &Arc<StateStore>,
        target: &Arc<StateStore>,
        cancel: CancellationToken,
        results: mpsc::Sender<ActionReport>,
    ) -> SyncReport {
        let results = self.config.emit_actions.then_some(results);
        self.run_inner(current, target, cancel, results).await
    }

    async fn run_inner(
        &self,
        current: &Arc<StateStore>,
        target: &Arc<StateStore>,
        cancel: CancellationToken,
        results: Option<mpsc::Sender<ActionReport>>,
    ) -> SyncReport {
        let retry = RetryPolicy::from(&self.config.retry);
        let pool = WorkerPool::new(self.config.parallelism);
        let mut report = SyncReport::default();

        for kind in self.registry.reverse_order() {
            let Some(plan) = self.registry.get(kind) else { continue };
            let mut events = Vec::new();
            plan.differ.duplicate_deletes(current, target, &mut |e| events.push(e));
            if events.is_empty() {
                continue;
            }
            let reports = pool
                .dispatch(
                    events,
                    plan.port.clone(),
                    plan.post_processor.clone(),
                    current.clone(),
                    &retry,
                    self.config.dry_run,
                    &cancel,
                    results.as_ref(),
                )
                .await;
            report.extend(reports);
        }

        for kind in self.registry.forward_order() {
            let Some(plan) = self.registry.get(kind) else { continue };
            let port = plan.port.clone();
            let schema = self
                .schema_cache
                .get_or_fetch(kind, || async { port.get_full_schema().await.ok().flatten() })
                .await;

            let mut events = Vec::new();
            if let Err(err) = plan
                .differ
                .create_and_updates(current, target, &schema.defaults, &mut |e| events.push(e))
            {
                tracing::warn!(%kind, error = %err, "differ failed, skipping kind for this pass");
                continue;
            }
            if events.is_empty() {
                continue;
            }
            let reports = pool
                .dispatch(
                    events,
                    plan.port.clone(),
                    plan.post_processor.clone(),
                    current.clone(),
                    &retry,
                    self.config.dry_run,
                    &cancel,
                    results.as_ref(),
                )
                .await;
            report.extend(reports);

            if self.config.stage_delay_secs > 0 {
                tokio::time::sleep(std::time::Duration::from_secs(self.config.stage_delay_secs)).await;
            }
        }

        for kind in self.registry.reverse_order() {
            let Some(plan) = self.registry.get(kind) else { continue };
            let mut events = Vec::new();
            plan.differ.deletes(current, target, &mut |e| events.push(e));
            if events.is_empty() {
                continue;
            }
            let reports = pool
                .dispatch(
                    events,
                    plan.port.clone(),
                    plan.post_processor.clone(),
                    current.clone(),
                    &retry,
                    self.config.dry_run,
                    &cancel,
                    results.as_ref(),
                )
                .await;
            report.extend(reports);
        }

        report
    }
}

/// Bounded-concurrency dispatch of one level's events. Workers pull from a
/// shared channel rather than each owning a static slice, so a kind whose
/// events are slow to converge doesn't starve the others once the fast ones
/// drain.
struct WorkerPool {
    parallelism: usize,
}

impl WorkerPool {
    fn new(parallelism: usize) -> Self {
        Self { parallelism: parallelism.max(1) }
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch(
        &self,
        events: Vec<Event>,
        port: Arc<dyn EntityPort>,
        post_processor: Arc<dyn PostProcessor>,
        mirror: Arc<StateStore>,
        retry: &RetryPolicy,
        dry_run: bool,
        cancel: &CancellationToken,
        results: Option<&mpsc::Sender<ActionReport>>,
    ) -> Vec<ActionReport> {
        if dry_run {
            let reports: Vec<ActionReport> = events.iter().map(ActionReport::planned).collect();
            if let Some(results) = results {
                for report in &reports {
                    let _ = results.send(report.clone()).await;
                }
            }
            return reports;
        }

        let total = events.len();
        let (tx, rx) = mpsc::channel::<Event>(total.max(1));
        for event in events {
            let _ = tx.send(event).await;
        }
        drop(tx);
        let rx = Arc::new(Mutex::new(rx));

        let (report_tx, mut report_rx) = mpsc::channel::<ActionReport>(total.max(1));
        let workers = self.parallelism.min(total.max(1));

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let rx = rx.clone();
            let port = port.clone();
            let post_processor = post_processor.clone();
            let retry = retry.clone();
            let report_tx = report_tx.clone();
            let cancel = cancel.clone();
            let mirror = mirror.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let next = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(event) = next else { break };
                    if cancel.is_cancelled() {
                        let _ = report_tx.send(ActionReport::cancelled(&event)).await;
                        continue;
                    }
                    let report = dispatch_one(port.as_ref(), post_processor.as_ref(), mirror.as_ref(), &retry, event).await;
                    let _ = report_tx.send(report).await;
                }
            }));
        }
        drop(report_tx);

        // The level barrier: this loop collects exactly `total` reports (one
        // per enqueued event) before `dispatch` returns, so the caller never
        // starts the next level until every event at this one has completed
        // or errored permanently — the receive-until-closed drain below IS
        // the "in-flight counter back to zero" condition, not a separate
        // counter.
        let mut reports = Vec::with_capacity(total);
        while let Some(report) = report_rx.recv().await {
            if let Some(results) = results {
                // Bounded send: a caller that stops draining `results`
                // back-pressures this loop, and therefore the workers
                // feeding it, exactly as spec'd for `emit_actions`.
                let _ = results.send(report.clone()).await;
            }
            reports.push(report);
        }
        for handle in handles {
            let _ = handle.await;
        }
        reports
    }
}

async fn dispatch_one(
    port: &dyn EntityPort,
    post_processor: &dyn PostProcessor,
    mirror: &StateStore,
    retry: &RetryPolicy,
    event: Event,
) -> ActionReport {
    if let Err(err) = check_identity_collision(port, &event).await {
        return ActionReport::failed(&event, err.to_string());
    }

    let mut attempt = 0;
    loop {
        let outcome: Result<gatesync_core::Entity, PortError> = match event.op {
            Op::Create => port.create(&event.obj).await,
            Op::Update => port.update(&event.obj).await,
            Op::Delete => port.delete(&event.obj).await.map(|()| event.obj.clone()),
        };

        match outcome {
            Ok(result) => {
                if let Err(err) = post_processor.apply(mirror, event.op, &result) {
                    return ActionReport::failed(&event, err.to_string());
                }
                return ActionReport::applied(&event, &result);
            }
            Err(err) => {
                if err.is_retryable() && attempt < retry.max_retries() {
                    tokio::time::sleep(retry.delay_for(attempt)).await;
                    attempt += 1;
                    continue;
                }
                return ActionReport::failed(&event, err.to_string());
            }
        }
    }
}

/// Declared-id-collision check: before creating an entity with a
/// caller-declared id, confirm the remote does not already have a live
/// entity under that id with a different natural key. Deferred here from
/// the differ (which is synchronous) since it needs a live port call.
async fn check_identity_collision(port: &dyn EntityPort, event: &Event) -> Result<(), CoreError> {
    if event.op != Op::Create || !event.obj.id_declared {
        return Ok(());
    }
    let Some(id) = event.obj.id.as_deref() else { return Ok(()) };
    let Ok(Some(existing)) = port.get_by_id(id).await else {
        return Ok(());
    };
    if existing.natural_key != event.obj.natural_key {
        return Err(CoreError::IdentityCollision {
            kind: event.kind.to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}
