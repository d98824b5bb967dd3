// ── Domain model ──

pub mod identity;
pub mod kind;
pub mod object;
pub mod state;

pub use identity::Identity;
pub use kind::{ResourceKind, Route};
pub use object::{ManagedObject, ReconcileState};
pub use state::{Attributes, DeclaredState, ObservedState, from_wire, to_wire};
