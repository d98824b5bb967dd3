// ── Provider facade ──
//
// One established session, the adapter registry, and the reconciler that
// drives them. This is the surface a host layer talks to.

use std::sync::Arc;

use tracing::{info, warn};

use appgate_api::{Diagnostic, Session};

use crate::adapter::{AdapterRegistry, CoreResult, ResourceAdapter};
use crate::config::ProviderConfig;
use crate::model::ResourceKind;
use crate::reconcile::Reconciler;

#[derive(Debug, Clone)]
pub struct Provider {
    reconciler: Reconciler,
    registry: Arc<AdapterRegistry>,
    diagnostics: Vec<Diagnostic>,
}

impl Provider {
    /// Establish a session from `config` and wire the standard adapters.
    ///
    /// Missing credentials are not an error: the provider comes up
    /// unauthenticated and [`diagnostics`](Self::diagnostics) carries the
    /// warning.
    pub async fn connect(config: &ProviderConfig) -> CoreResult<Self> {
        let established = Session::establish_with_transport(
            &config.credentials(),
            Some(config.client_version),
            &config.transport(),
        )
        .await?;

        for diag in &established.diagnostics {
            warn!(summary = %diag.summary, "{}", diag.detail);
        }
        info!(
            url = %config.url,
            version = %established.session.version(),
            authenticated = established.session.is_authenticated(),
            "provider connected"
        );

        let mut provider = Self::with_session(
            Arc::new(established.session),
            Arc::new(AdapterRegistry::standard()),
        );
        provider.diagnostics = established.diagnostics;
        Ok(provider)
    }

    /// Build around an existing session and registry.
    pub fn with_session(session: Arc<Session>, registry: Arc<AdapterRegistry>) -> Self {
        Self {
            reconciler: Reconciler::new(session, Arc::clone(&registry)),
            registry,
            diagnostics: Vec::new(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.reconciler.session()
    }

    /// Diagnostics produced while establishing the session.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The adapter for `kind` on the negotiated API version.
    pub fn adapter(&self, kind: ResourceKind) -> CoreResult<Arc<dyn ResourceAdapter>> {
        self.registry.get(kind, self.session().surface())
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Every kind available on the negotiated API version.
    pub fn kinds(&self) -> Vec<ResourceKind> {
        self.registry.kinds(self.session().surface())
    }
}
