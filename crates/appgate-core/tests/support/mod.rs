// In-memory adapter for reconciler tests.
//
// Stores objects in a map, records every call, and can be told to fail the
// next call of a given operation or to stall reads.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use appgate_api::{Credentials, Session};
use appgate_core::{
    Ack, AdapterRegistry, Attributes, CoreError, CoreResult, DeclaredState, Identity,
    ObservedState, Operation, Reconciler, ResourceAdapter, ResourceKind,
};

pub const KIND: ResourceKind = ResourceKind::Site;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    Read(Identity),
    Update(Identity),
    Delete(Identity),
    Lookup(String),
}

#[derive(Default)]
pub struct FakeAdapter {
    remote: Mutex<HashMap<Identity, Attributes>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<(Operation, CoreError)>>,
    read_delay: Mutex<Option<Duration>>,
}

impl FakeAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|&c| pred(c)).count()
    }

    /// Fail the next call of `op` with `err`.
    pub fn fail_next(&self, op: Operation, err: CoreError) {
        self.failures.lock().unwrap().push((op, err));
    }

    pub fn stall_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    /// Change a field behind the reconciler's back.
    pub fn tamper(&self, identity: &Identity, field: &str, value: Value) {
        self.remote
            .lock()
            .unwrap()
            .get_mut(identity)
            .unwrap()
            .insert(field.to_owned(), value);
    }

    /// Delete an object behind the reconciler's back.
    pub fn vanish(&self, identity: &Identity) {
        self.remote.lock().unwrap().remove(identity);
    }

    pub fn remote(&self, identity: &Identity) -> Option<Attributes> {
        self.remote.lock().unwrap().get(identity).cloned()
    }

    pub fn len(&self) -> usize {
        self.remote.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, op: Operation) -> CoreResult<()> {
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(o, _)| *o == op) {
            Some(i) => Err(failures.remove(i).1),
            None => Ok(()),
        }
    }

    fn not_found(identity: &Identity) -> CoreError {
        CoreError::NotFound {
            kind: KIND.type_name(),
            identity: identity.to_string(),
        }
    }

    fn stored(identity: &Identity, attrs: &Attributes) -> ObservedState {
        let mut attrs = attrs.clone();
        attrs.insert("id".into(), Value::String(identity.to_string()));
        ObservedState::new(attrs)
    }
}

#[async_trait]
impl ResourceAdapter for FakeAdapter {
    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn set_fields(&self) -> &'static [&'static str] {
        &["tags"]
    }

    async fn create(
        &self,
        _session: &Session,
        declared: &DeclaredState,
    ) -> CoreResult<(Identity, ObservedState)> {
        self.record(Call::Create);
        self.injected(Operation::Create)?;
        let identity = Identity::from(Uuid::new_v4());
        let attrs = declared.attributes().clone();
        self.remote
            .lock()
            .unwrap()
            .insert(identity.clone(), attrs.clone());
        Ok((identity.clone(), Self::stored(&identity, &attrs)))
    }

    async fn read(&self, _session: &Session, identity: &Identity) -> CoreResult<ObservedState> {
        self.record(Call::Read(identity.clone()));
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.injected(Operation::Read)?;
        self.remote
            .lock()
            .unwrap()
            .get(identity)
            .map(|attrs| Self::stored(identity, attrs))
            .ok_or_else(|| Self::not_found(identity))
    }

    async fn update(
        &self,
        _session: &Session,
        identity: &Identity,
        declared: &DeclaredState,
    ) -> CoreResult<ObservedState> {
        self.record(Call::Update(identity.clone()));
        self.injected(Operation::Update)?;
        let mut remote = self.remote.lock().unwrap();
        let attrs = remote
            .get_mut(identity)
            .ok_or_else(|| Self::not_found(identity))?;
        for (k, v) in declared.attributes() {
            attrs.insert(k.clone(), v.clone());
        }
        Ok(Self::stored(identity, attrs))
    }

    async fn delete(&self, _session: &Session, identity: &Identity) -> CoreResult<Ack> {
        self.record(Call::Delete(identity.clone()));
        self.injected(Operation::Delete)?;
        self.remote
            .lock()
            .unwrap()
            .remove(identity)
            .map(|_| Ack)
            .ok_or_else(|| Self::not_found(identity))
    }

    async fn lookup(
        &self,
        _session: &Session,
        name: &str,
    ) -> CoreResult<Vec<(Identity, ObservedState)>> {
        self.record(Call::Lookup(name.to_owned()));
        Ok(self
            .remote
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, a)| a.get("name").and_then(Value::as_str) == Some(name))
            .map(|(id, a)| (id.clone(), Self::stored(id, a)))
            .collect())
    }
}

/// A session that never touches the network.
pub async fn offline_session() -> Arc<Session> {
    let url = Url::parse("https://controller.invalid/admin").unwrap();
    let creds = Credentials::new(url, "", SecretString::from(String::new()));
    Arc::new(Session::establish(&creds, Some(16)).await.unwrap().session)
}

/// A reconciler whose only adapter is `fake`.
pub async fn reconciler(fake: &Arc<FakeAdapter>) -> Reconciler {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::clone(fake) as Arc<dyn ResourceAdapter>);
    Reconciler::new(offline_session().await, Arc::new(registry))
}
