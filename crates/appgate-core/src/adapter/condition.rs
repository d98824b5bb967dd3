// Condition adapter
//
// The typed reference adapter. Declarations are parsed into a
// `ConditionSpec` up front, so malformed input fails locally with
// `InvalidDeclaration` instead of as a remote validation error.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use appgate_api::Session;
use appgate_api::models::{Condition, RemedyMethod};

use super::{Ack, CoreResult, ResourceAdapter};
use crate::error::{CoreError, Operation};
use crate::model::{DeclaredState, Identity, ObservedState, ResourceKind, from_wire, to_wire};

/// Notes written when a declaration leaves them out.
pub const DEFAULT_NOTES: &str = "Managed by terraform";

const KIND: ResourceKind = ResourceKind::Condition;

/// A validated condition declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConditionSpec {
    pub name: String,
    pub expression: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub repeat_schedules: BTreeSet<String>,
    #[serde(default)]
    pub remedy_methods: Vec<RemedyMethod>,
    #[serde(default)]
    pub remedy_logic: Option<String>,
}

impl ConditionSpec {
    pub fn from_declared(declared: &DeclaredState) -> CoreResult<Self> {
        let wire = Value::Object(to_wire(declared.attributes()));
        let spec: Self =
            serde_json::from_value(wire).map_err(|e| CoreError::InvalidDeclaration {
                kind: KIND.type_name(),
                message: e.to_string(),
            })?;
        if spec.name.trim().is_empty() {
            return Err(CoreError::InvalidDeclaration {
                kind: KIND.type_name(),
                message: "name must not be empty".into(),
            });
        }
        Ok(spec)
    }

    pub fn to_model(&self, id: Option<&Identity>) -> Condition {
        Condition {
            id: id.map(ToString::to_string),
            name: self.name.clone(),
            notes: Some(
                self.notes
                    .clone()
                    .unwrap_or_else(|| DEFAULT_NOTES.to_owned()),
            ),
            tags: self.tags.clone(),
            expression: self.expression.clone(),
            repeat_schedules: self.repeat_schedules.clone(),
            remedy_methods: self.remedy_methods.clone(),
            remedy_logic: self.remedy_logic.clone(),
        }
    }
}

/// Snake-case attribute view of a stored condition.
fn observed(condition: &Condition) -> CoreResult<ObservedState> {
    match serde_json::to_value(condition) {
        Ok(Value::Object(map)) => Ok(ObservedState::new(from_wire(&map))),
        Ok(_) => Err(CoreError::InvalidDeclaration {
            kind: KIND.type_name(),
            message: "condition did not serialize to an object".into(),
        }),
        Err(e) => Err(CoreError::InvalidDeclaration {
            kind: KIND.type_name(),
            message: e.to_string(),
        }),
    }
}

fn api_err(
    op: Operation,
    identity: Option<&Identity>,
) -> impl FnOnce(appgate_api::Error) -> CoreError {
    let identity = identity.cloned();
    move |e| CoreError::from_api(e, KIND, op, identity.as_ref())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionAdapter;

#[async_trait]
impl ResourceAdapter for ConditionAdapter {
    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn normalize(&self, declared: &DeclaredState) -> CoreResult<DeclaredState> {
        let spec = ConditionSpec::from_declared(declared)?;
        let mut attrs = observed(&spec.to_model(None))?.into_attributes();
        attrs.remove("id");
        Ok(DeclaredState::new(attrs))
    }

    fn set_fields(&self) -> &'static [&'static str] {
        &["tags", "repeat_schedules", "remedy_methods"]
    }

    async fn create(
        &self,
        session: &Session,
        declared: &DeclaredState,
    ) -> CoreResult<(Identity, ObservedState)> {
        let spec = ConditionSpec::from_declared(declared)?;
        let stored = session
            .create_condition(&spec.to_model(None))
            .await
            .map_err(api_err(Operation::Create, None))?;

        let identity = stored
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(Identity::from)
            .ok_or_else(|| CoreError::Remote {
                kind: KIND.type_name(),
                operation: Operation::Create,
                identity: String::new(),
                message: "controller response carried no condition id".into(),
                status: None,
            })?;
        debug!(%identity, name = %stored.name, "condition created");
        Ok((identity, observed(&stored)?))
    }

    async fn read(&self, session: &Session, identity: &Identity) -> CoreResult<ObservedState> {
        let stored = session
            .get_condition(&identity.to_path_segment())
            .await
            .map_err(api_err(Operation::Read, Some(identity)))?;
        observed(&stored)
    }

    async fn update(
        &self,
        session: &Session,
        identity: &Identity,
        declared: &DeclaredState,
    ) -> CoreResult<ObservedState> {
        let spec = ConditionSpec::from_declared(declared)?;
        let stored = session
            .update_condition(&identity.to_path_segment(), &spec.to_model(Some(identity)))
            .await
            .map_err(api_err(Operation::Update, Some(identity)))?;
        observed(&stored)
    }

    async fn delete(&self, session: &Session, identity: &Identity) -> CoreResult<Ack> {
        session
            .delete_condition(&identity.to_path_segment())
            .await
            .map_err(api_err(Operation::Delete, Some(identity)))?;
        Ok(Ack)
    }

    async fn lookup(
        &self,
        session: &Session,
        name: &str,
    ) -> CoreResult<Vec<(Identity, ObservedState)>> {
        let listed = session
            .list_conditions(Some(name))
            .await
            .map_err(api_err(Operation::Lookup, None))?;
        listed
            .iter()
            .filter(|c| c.name == name)
            .filter_map(|c| c.id.as_deref().map(|id| (Identity::from(id), c)))
            .map(|(id, c)| observed(c).map(|o| (id, o)))
            .collect()
    }
}
