// appgate-core: Declarative reconciliation engine between appgate-api and hosts.

pub mod adapter;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod provider;
pub mod reconcile;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::{
    Ack, AdapterRegistry, ConditionAdapter, ConditionSpec, CoreResult, ResourceAdapter,
    RestAdapter,
};
pub use config::ProviderConfig;
pub use data::{ApplianceSeed, DataSource, SeedOptions};
pub use error::{CoreError, Operation};
pub use provider::Provider;
pub use reconcile::{Change, PassOptions, PassReport, Reconciler, declare};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Attributes, DeclaredState, Identity, ManagedObject, ObservedState, ReconcileState,
    ResourceKind, Route,
};

// Session types hosts need without depending on appgate-api directly.
pub use appgate_api::{Diagnostic, Session, Severity};
