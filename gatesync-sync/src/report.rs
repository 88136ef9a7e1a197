//! Run report: one `ActionReport` per diffed event, each carrying its
//! outcome and, for updates, a rendered diff, plus a `SyncReport` summary
//! over an entire run's actions.

use gatesync_core::diff_render::{render_diff, DiffLine};
use gatesync_core::{Entity, EntityKind, Event, Op};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// `dry_run` was set; the action was diffed but never dispatched.
    Planned,
    Applied,
    Failed,
    /// A cooperative cancellation aborted the run before this action ran.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ActionReport {
    pub op: Op,
    pub kind: EntityKind,
    pub id: Option<String>,
    /// Natural-key-derived display name, falling back to the id for kinds
    /// with no natural key (targets, most credentials) — the identity
    /// `EntityChanges` keys its per-kind lists by.
    pub name: String,
    pub outcome: ActionOutcome,
    pub diff: Vec<DiffLine>,
    pub error: Option<String>,
}

impl ActionReport {
    fn diff_for(event: &Event) -> Vec<DiffLine> {
        match (&event.old_obj, event.op) {
            (Some(old), Op::Update) => render_diff(&old.attrs, &event.obj.attrs, true),
            _ if event.op == Op::Delete => render_diff(&event.obj.attrs, &serde_json::Value::Null, true),
            _ => render_diff(&serde_json::Value::Null, &event.obj.attrs, true),
        }
    }

    fn name_for(event: &Event) -> String {
        event
            .obj
            .natural_key
            .as_lookup_string()
            .or_else(|| event.obj.id.clone())
            .unwrap_or_else(|| "<unnamed>".to_string())
    }

    pub fn planned(event: &Event) -> Self {
        Self {
            op: event.op,
            kind: event.kind,
            id: event.obj.id.clone(),
            name: Self::name_for(event),
            outcome: ActionOutcome::Planned,
            diff: Self::diff_for(event),
            error: None,
        }
    }

    pub fn cancelled(event: &Event) -> Self {
        Self {
            op: event.op,
            kind: event.kind,
            id: event.obj.id.clone(),
            name: Self::name_for(event),
            outcome: ActionOutcome::Cancelled,
            diff: Vec::new(),
            error: None,
        }
    }

    pub fn applied(event: &Event, _result: &Entity) -> Self {
        Self {
            op: event.op,
            kind: event.kind,
            id: event.obj.id.clone(),
            name: Self::name_for(event),
            outcome: ActionOutcome::Applied,
            diff: Self::diff_for(event),
            error: None,
        }
    }

    pub fn failed(event: &Event, error: String) -> Self {
        Self {
            op: event.op,
            kind: event.kind,
            id: event.obj.id.clone(),
            name: Self::name_for(event),
            outcome: ActionOutcome::Failed,
            diff: Self::diff_for(event),
            error: Some(error),
        }
    }
}

/// Counters of `{create, update, delete}` operations actually recorded by a
/// run — `Applied` actions, plus `Planned` ones under `dry_run` (there is
/// nothing else to count in that mode). `Failed`/`Cancelled` actions are
/// excluded; they changed nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl SyncStats {
    fn record(&mut self, op: Op) {
        match op {
            Op::Create => self.creates += 1,
            Op::Update => self.updates += 1,
            Op::Delete => self.deletes += 1,
        }
    }
}

/// One entity identified by kind and natural-key-derived name, for the
/// legacy-mode per-kind change lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityChange {
    pub kind: EntityKind,
    pub name: String,
}

/// Legacy direct-print mode's entity-change summary: per-kind lists of
/// creating/updating/deleting names, keyed by entity name and kind.
#[derive(Debug, Clone, Default)]
pub struct EntityChanges {
    pub creating: Vec<EntityChange>,
    pub updating: Vec<EntityChange>,
    pub deleting: Vec<EntityChange>,
}

impl EntityChanges {
    fn record(&mut self, op: Op, kind: EntityKind, name: String) {
        let change = EntityChange { kind, name };
        match op {
            Op::Create => self.creating.push(change),
            Op::Update => self.updating.push(change),
            Op::Delete => self.deleting.push(change),
        }
    }
}

/// Full-run summary: every dispatched action plus aggregate counts, the way
/// a reporter would print a final tally after a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub actions: Vec<ActionReport>,
}

impl SyncReport {
    pub fn push(&mut self, report: ActionReport) {
        self.actions.push(report);
    }

    pub fn extend(&mut self, reports: Vec<ActionReport>) {
        self.actions.extend(reports);
    }

    /// Counters of recorded operations (spec §6 "stats summary"). Derived
    /// from `actions` rather than tracked incrementally, so it stays correct
    /// regardless of how the report was assembled (`push`/`extend`/both).
    pub fn stats(&self) -> SyncStats {
        let mut stats = SyncStats::default();
        for action in self.recorded_actions() {
            stats.record(action.op);
        }
        stats
    }

    /// Legacy-mode per-kind creating/updating/deleting name lists (spec §6
    /// `EntityChanges`).
    pub fn changes(&self) -> EntityChanges {
        let mut changes = EntityChanges::default();
        for action in self.recorded_actions() {
            changes.record(action.op, action.kind, action.name.clone());
        }
        changes
    }

    fn recorded_actions(&self) -> impl Iterator<Item = &ActionReport> {
        self.actions
            .iter()
            .filter(|a| matches!(a.outcome, ActionOutcome::Applied | ActionOutcome::Planned))
    }

    pub fn applied_count(&self) -> usize {
        self.actions.iter().filter(|a| a.outcome == ActionOutcome::Applied).count()
    }

    pub fn failed_count(&self) -> usize {
        self.actions.iter().filter(|a| a.outcome == ActionOutcome::Failed).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}
