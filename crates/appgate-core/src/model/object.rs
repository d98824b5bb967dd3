// ── Managed object ──
//
// One declared object and everything the reconciler remembers about it
// between passes. The host persists this (it is serde-serializable) and
// hands it back on the next pass.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::identity::Identity;
use super::kind::ResourceKind;
use super::state::{DeclaredState, ObservedState};

/// Where an object stands in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReconcileState {
    /// Nothing declared and nothing remote.
    #[default]
    Absent,
    /// Declared, not yet created.
    DeclaredOnly,
    Creating,
    /// Remote matches declared on every managed field.
    Synced,
    Updating,
    /// Remote changed behind our back and correction was not requested.
    Drifted,
    Deleting,
    /// The last operation failed; identity (if any) is preserved.
    Error,
}

impl ReconcileState {
    /// States in which an operation is mid-flight.
    pub fn is_transitional(self) -> bool {
        matches!(self, Self::Creating | Self::Updating | Self::Deleting)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedObject {
    pub kind: ResourceKind,
    /// Assigned by the controller on create; never changes afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub declared: DeclaredState,
    /// Last snapshot read back from the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ObservedState>,
    #[serde(default)]
    pub state: ReconcileState,
    #[serde(default)]
    pub delete_requested: bool,
}

impl ManagedObject {
    /// A freshly declared object with no remote counterpart yet.
    pub fn declare(kind: ResourceKind, declared: DeclaredState) -> Self {
        Self {
            kind,
            identity: None,
            declared,
            observed: None,
            state: ReconcileState::DeclaredOnly,
            delete_requested: false,
        }
    }

    /// An object that already exists remotely, e.g. imported by identity.
    pub fn adopt(kind: ResourceKind, identity: Identity, declared: DeclaredState) -> Self {
        Self {
            identity: Some(identity),
            ..Self::declare(kind, declared)
        }
    }

    /// Flag the object for removal on the next pass.
    pub fn request_delete(&mut self) {
        self.delete_requested = true;
    }

    pub fn is_created(&self) -> bool {
        self.identity.is_some()
    }
}
