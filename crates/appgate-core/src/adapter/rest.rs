// Generic REST adapter
//
// Serves every kind whose payload needs no typed handling: translate keys,
// inject the kind's discriminator, route by collection or singleton path.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use appgate_api::Session;

use super::{Ack, CoreResult, ResourceAdapter};
use crate::error::{CoreError, Operation};
use crate::model::{
    DeclaredState, Identity, ObservedState, ResourceKind, Route, from_wire, to_wire,
};

#[derive(Debug, Clone, Copy)]
pub struct RestAdapter {
    kind: ResourceKind,
}

impl RestAdapter {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }

    fn route(&self) -> Route {
        self.kind.route()
    }

    /// Path addressing one object of this kind.
    fn object_path(&self, identity: &Identity) -> String {
        match self.route() {
            Route::Collection { path, .. } => format!("{path}/{}", identity.to_path_segment()),
            Route::Singleton { path } => path.to_owned(),
        }
    }

    /// Wire body for a declaration, discriminator included.
    fn body(&self, declared: &DeclaredState) -> Map<String, Value> {
        let mut body = to_wire(declared.attributes());
        body.extend(self.kind.fixed_attributes());
        body
    }

    fn observed(
        &self,
        op: Operation,
        identity: Option<&Identity>,
        stored: Value,
    ) -> CoreResult<ObservedState> {
        match stored {
            Value::Object(map) => Ok(ObservedState::new(from_wire(&map))),
            other => Err(CoreError::Remote {
                kind: self.kind.type_name(),
                operation: op,
                identity: identity.map(ToString::to_string).unwrap_or_default(),
                message: format!("expected a JSON object, got {other}"),
                status: None,
            }),
        }
    }

    /// Identity carried by a stored object.
    fn identity_of(&self, stored: &Value) -> Option<Identity> {
        match self.route() {
            Route::Collection { id_field, .. } => match stored.get(id_field)? {
                Value::String(s) if !s.is_empty() => Some(Identity::from(s.as_str())),
                _ => None,
            },
            Route::Singleton { path } => Some(Identity::Named(path.to_owned())),
        }
    }

    /// Whether a listed object belongs to this kind (shared collections).
    fn owns(&self, stored: &Value) -> bool {
        self.kind
            .fixed_attributes()
            .iter()
            .all(|(k, v)| stored.get(k) == Some(v))
    }

    fn api_err(
        &self,
        op: Operation,
        identity: Option<&Identity>,
    ) -> impl FnOnce(appgate_api::Error) -> CoreError {
        let kind = self.kind;
        let identity = identity.cloned();
        move |e| CoreError::from_api(e, kind, op, identity.as_ref())
    }
}

#[async_trait]
impl ResourceAdapter for RestAdapter {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn create(
        &self,
        session: &Session,
        declared: &DeclaredState,
    ) -> CoreResult<(Identity, ObservedState)> {
        let body = Value::Object(self.body(declared));
        let stored = match self.route() {
            Route::Collection { path, .. } => session.create_object(path, &body).await,
            Route::Singleton { path } => session.replace_object(path, &body).await,
        }
        .map_err(self.api_err(Operation::Create, None))?;

        let identity = self.identity_of(&stored).ok_or_else(|| CoreError::Remote {
            kind: self.kind.type_name(),
            operation: Operation::Create,
            identity: String::new(),
            message: "controller response carried no identity".into(),
            status: None,
        })?;
        debug!(kind = %self.kind, %identity, "created");
        let observed = self.observed(Operation::Create, Some(&identity), stored)?;
        Ok((identity, observed))
    }

    async fn read(&self, session: &Session, identity: &Identity) -> CoreResult<ObservedState> {
        let stored = session
            .get_object(&self.object_path(identity))
            .await
            .map_err(self.api_err(Operation::Read, Some(identity)))?;
        self.observed(Operation::Read, Some(identity), stored)
    }

    async fn update(
        &self,
        session: &Session,
        identity: &Identity,
        declared: &DeclaredState,
    ) -> CoreResult<ObservedState> {
        let mut body = self.body(declared);
        if let Route::Collection { id_field, .. } = self.route() {
            body.insert(id_field.to_owned(), Value::String(identity.to_string()));
        }
        let stored = session
            .replace_object(&self.object_path(identity), &Value::Object(body))
            .await
            .map_err(self.api_err(Operation::Update, Some(identity)))?;
        self.observed(Operation::Update, Some(identity), stored)
    }

    async fn delete(&self, session: &Session, identity: &Identity) -> CoreResult<Ack> {
        session
            .delete_object(&self.object_path(identity))
            .await
            .map_err(self.api_err(Operation::Delete, Some(identity)))?;
        Ok(Ack)
    }

    async fn lookup(
        &self,
        session: &Session,
        name: &str,
    ) -> CoreResult<Vec<(Identity, ObservedState)>> {
        let candidates = match self.route() {
            Route::Collection { path, .. } => session
                .list_objects(path, Some(name))
                .await
                .map_err(self.api_err(Operation::Lookup, None))?,
            Route::Singleton { path } => vec![
                session
                    .get_object(path)
                    .await
                    .map_err(self.api_err(Operation::Lookup, None))?,
            ],
        };

        let id_field = match self.route() {
            Route::Collection { id_field, .. } => Some(id_field),
            Route::Singleton { .. } => None,
        };
        let mut found = Vec::new();
        for stored in candidates {
            let named = self.kind.is_singleton()
                || stored.get("name").and_then(Value::as_str) == Some(name)
                || id_field.and_then(|f| stored.get(f)).and_then(Value::as_str) == Some(name);
            if !named || !self.owns(&stored) {
                continue;
            }
            let Some(identity) = self.identity_of(&stored) else {
                continue;
            };
            let observed = self.observed(Operation::Lookup, Some(&identity), stored)?;
            found.push((identity, observed));
        }
        Ok(found)
    }
}
