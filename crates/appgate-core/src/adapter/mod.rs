// ── Resource adapters ──
//
// One adapter per managed kind, all behind the same CRUD contract. Adapters
// are stateless: everything they need arrives as arguments, and the session
// is borrowed per call so a single `Arc<Session>` can serve every kind.

mod condition;
mod registry;
mod rest;

use std::collections::BTreeSet;

use async_trait::async_trait;

use appgate_api::Session;

use crate::error::CoreError;
use crate::model::{DeclaredState, Identity, ObservedState, ResourceKind};

pub use condition::{ConditionAdapter, ConditionSpec, DEFAULT_NOTES};
pub use registry::AdapterRegistry;
pub use rest::RestAdapter;

pub type CoreResult<T> = Result<T, CoreError>;

/// Positive acknowledgement of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

/// Uniform CRUD contract for one managed kind.
///
/// `read` and `delete` report a missing object as
/// [`CoreError::NotFound`]; the reconciler gives that its own meaning.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Fill in the defaults the controller would apply, so that comparing
    /// declared against observed state does not flag them as differences.
    fn normalize(&self, declared: &DeclaredState) -> CoreResult<DeclaredState> {
        Ok(declared.clone())
    }

    /// Fields this adapter owns for the given declaration.
    fn managed_fields(&self, declared: &DeclaredState) -> BTreeSet<String> {
        declared.attributes().keys().cloned().collect()
    }

    /// Array fields whose element order carries no meaning.
    fn set_fields(&self) -> &'static [&'static str] {
        &[]
    }

    async fn create(
        &self,
        session: &Session,
        declared: &DeclaredState,
    ) -> CoreResult<(Identity, ObservedState)>;

    async fn read(&self, session: &Session, identity: &Identity) -> CoreResult<ObservedState>;

    async fn update(
        &self,
        session: &Session,
        identity: &Identity,
        declared: &DeclaredState,
    ) -> CoreResult<ObservedState>;

    async fn delete(&self, session: &Session, identity: &Identity) -> CoreResult<Ack>;

    /// Existing objects whose name matches exactly.
    async fn lookup(
        &self,
        session: &Session,
        name: &str,
    ) -> CoreResult<Vec<(Identity, ObservedState)>>;
}
