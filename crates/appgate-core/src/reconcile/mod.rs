// ── Reconciler ──
//
// Drives one managed object per call through create/read/update/delete so
// that the controller converges on the declared state. Each pass issues at
// most one mutating call per object, never retries, and records where the
// object ended up in `ManagedObject::state`.

mod diff;

use std::sync::Arc;

use dashmap::DashSet;
use tracing::{debug, info, warn};

use appgate_api::{Diagnostic, Session};

use crate::adapter::{AdapterRegistry, CoreResult, ResourceAdapter};
use crate::error::CoreError;
use crate::model::{
    DeclaredState, Identity, ManagedObject, ObservedState, ReconcileState, ResourceKind,
};

pub use diff::changed_fields;

/// Knobs for a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOptions {
    /// Overwrite remote drift (and re-create vanished objects) instead of
    /// only reporting it.
    pub correct_drift: bool,
}

impl PassOptions {
    pub fn correcting() -> Self {
        Self {
            correct_drift: true,
        }
    }
}

/// What a pass did to the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Created,
    Updated { fields: Vec<String> },
    Deleted,
    /// Vanished remotely and was created again.
    Recreated,
    /// Remote managed fields changed; left alone.
    Drifted { fields: Vec<String> },
    /// Vanished remotely; left alone.
    Vanished,
}

/// Outcome of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub state: ReconcileState,
    pub change: Change,
    pub diagnostics: Vec<Diagnostic>,
}

impl PassReport {
    fn new(state: ReconcileState, change: Change) -> Self {
        Self {
            state,
            change,
            diagnostics: Vec::new(),
        }
    }

    fn with_warning(mut self, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        self.diagnostics.push(Diagnostic::warning(summary, detail));
        self
    }
}

type InFlight = DashSet<(ResourceKind, Identity)>;

/// Marks one identity as being reconciled until dropped.
struct InFlightGuard<'a> {
    set: &'a InFlight,
    key: (ResourceKind, Identity),
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a InFlight, kind: ResourceKind, identity: &Identity) -> CoreResult<Self> {
        let key = (kind, identity.clone());
        if !set.insert(key.clone()) {
            return Err(CoreError::Busy {
                kind: kind.type_name(),
                identity: identity.to_string(),
            });
        }
        Ok(Self { set, key })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

/// Shared reconciliation engine. Cheap to clone; clones share the
/// in-flight set, so the busy check holds across them.
#[derive(Debug, Clone)]
pub struct Reconciler {
    session: Arc<Session>,
    registry: Arc<AdapterRegistry>,
    in_flight: Arc<InFlight>,
}

impl Reconciler {
    pub fn new(session: Arc<Session>, registry: Arc<AdapterRegistry>) -> Self {
        Self {
            session,
            registry,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn adapter(&self, kind: ResourceKind) -> CoreResult<Arc<dyn ResourceAdapter>> {
        self.registry.get(kind, self.session.surface())
    }

    /// Existing objects of `kind` named `name`, for adopting them by identity.
    pub async fn lookup(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> CoreResult<Vec<(Identity, ObservedState)>> {
        self.adapter(kind)?.lookup(&self.session, name).await
    }

    /// Run one reconciliation pass over `object`.
    ///
    /// On failure the object is left in [`ReconcileState::Error`] with its
    /// identity intact, and the error is returned with kind, identity and
    /// operation attached. A concurrent pass on the same identity is
    /// refused with [`CoreError::Busy`] and leaves the object untouched.
    pub async fn reconcile(
        &self,
        object: &mut ManagedObject,
        options: PassOptions,
    ) -> CoreResult<PassReport> {
        let _guard = match &object.identity {
            Some(identity) => Some(InFlightGuard::acquire(
                &self.in_flight,
                object.kind,
                identity,
            )?),
            None => None,
        };

        match self.pass(object, options).await {
            Ok(report) => {
                info!(
                    kind = %object.kind,
                    identity = ?object.identity.as_ref().map(ToString::to_string),
                    state = %report.state,
                    change = ?report.change,
                    "pass complete"
                );
                Ok(report)
            }
            Err(err) => {
                object.state = ReconcileState::Error;
                warn!(
                    kind = %object.kind,
                    identity = ?object.identity.as_ref().map(ToString::to_string),
                    error = %err,
                    "pass failed"
                );
                Err(err)
            }
        }
    }

    async fn pass(
        &self,
        object: &mut ManagedObject,
        options: PassOptions,
    ) -> CoreResult<PassReport> {
        let adapter = self.adapter(object.kind)?;

        // Deletion wins over any pending update.
        if object.delete_requested {
            return self.delete(adapter.as_ref(), object).await;
        }

        let Some(identity) = object.identity.clone() else {
            // Nothing declared and nothing remote: not a managed object yet.
            if object.declared.is_empty() {
                object.observed = None;
                object.state = ReconcileState::Absent;
                return Ok(PassReport::new(ReconcileState::Absent, Change::Unchanged));
            }
            return self.create(adapter.as_ref(), object, Change::Created).await;
        };

        let desired = adapter.normalize(&object.declared)?;
        let managed = adapter.managed_fields(&desired);
        let set_fields = adapter.set_fields();

        let fresh = match adapter.read(&self.session, &identity).await {
            Ok(fresh) => fresh,
            Err(err) if err.is_not_found() => {
                warn!(kind = %object.kind, %identity, "object vanished from the controller");
                if options.correct_drift {
                    object.identity = None;
                    object.observed = None;
                    return self.create(adapter.as_ref(), object, Change::Recreated).await;
                }
                object.observed = None;
                object.state = ReconcileState::Drifted;
                return Ok(
                    PassReport::new(ReconcileState::Drifted, Change::Vanished).with_warning(
                        format!("{} {identity} no longer exists", object.kind.type_name()),
                        "The object was deleted outside of this workspace. \
                         Correct drift to create it again.",
                    ),
                );
            }
            Err(err) => return Err(err),
        };

        let baseline = object.observed.take();
        let drift = baseline.as_ref().map_or_else(Vec::new, |b| {
            changed_fields(b.attributes(), fresh.attributes(), &managed, set_fields)
        });
        let pending = changed_fields(desired.attributes(), fresh.attributes(), &managed, set_fields);
        let mut merged = ObservedState::refresh(baseline.as_ref(), fresh, &managed);

        if pending.is_empty() {
            object.observed = Some(merged);
            object.state = ReconcileState::Synced;
            return Ok(PassReport::new(ReconcileState::Synced, Change::Unchanged));
        }

        if !drift.is_empty() && !options.correct_drift {
            warn!(kind = %object.kind, %identity, fields = ?drift, "remote drift detected");
            if let Some(baseline) = &baseline {
                merged.restore(baseline, &drift);
            }
            object.observed = Some(merged);
            object.state = ReconcileState::Drifted;
            let detail = format!("Changed outside of this workspace: {}", drift.join(", "));
            return Ok(
                PassReport::new(ReconcileState::Drifted, Change::Drifted { fields: drift })
                    .with_warning(format!("{} {identity} drifted", object.kind.type_name()), detail),
            );
        }

        object.state = ReconcileState::Updating;
        object.observed = Some(merged);
        debug!(kind = %object.kind, %identity, fields = ?pending, "updating");
        let updated = adapter
            .update(&self.session, &identity, &object.declared)
            .await?;
        object.observed = Some(ObservedState::refresh(
            object.observed.as_ref(),
            updated,
            &managed,
        ));
        object.state = ReconcileState::Synced;
        Ok(PassReport::new(
            ReconcileState::Synced,
            Change::Updated { fields: pending },
        ))
    }

    /// Create, then read back. The identity is recorded as soon as the
    /// controller assigns it, so a failed read-back resumes from Read.
    async fn create(
        &self,
        adapter: &dyn ResourceAdapter,
        object: &mut ManagedObject,
        change: Change,
    ) -> CoreResult<PassReport> {
        object.state = ReconcileState::Creating;
        let (identity, created) = adapter.create(&self.session, &object.declared).await?;
        object.identity = Some(identity.clone());
        object.observed = Some(created);

        let fresh = adapter.read(&self.session, &identity).await?;
        object.observed = Some(fresh);
        object.state = ReconcileState::Synced;
        Ok(PassReport::new(ReconcileState::Synced, change))
    }

    async fn delete(
        &self,
        adapter: &dyn ResourceAdapter,
        object: &mut ManagedObject,
    ) -> CoreResult<PassReport> {
        let Some(identity) = object.identity.clone() else {
            object.observed = None;
            object.state = ReconcileState::Absent;
            return Ok(PassReport::new(ReconcileState::Absent, Change::Unchanged));
        };

        object.state = ReconcileState::Deleting;
        let change = match adapter.delete(&self.session, &identity).await {
            Ok(_) => Change::Deleted,
            Err(err) if err.is_not_found() => {
                debug!(kind = %object.kind, %identity, "already gone");
                Change::Unchanged
            }
            Err(err) => return Err(err),
        };

        object.identity = None;
        object.observed = None;
        object.state = ReconcileState::Absent;
        Ok(PassReport::new(ReconcileState::Absent, change))
    }
}

/// Convenience for hosts that hold declarations as JSON.
pub fn declare(kind: ResourceKind, declared: serde_json::Value) -> CoreResult<ManagedObject> {
    let declared = DeclaredState::try_from(declared).map_err(|other| {
        CoreError::InvalidDeclaration {
            kind: kind.type_name(),
            message: format!("expected a JSON object, got {other}"),
        }
    })?;
    Ok(ManagedObject::declare(kind, declared))
}
