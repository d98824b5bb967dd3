// Wire models shared across endpoints.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// List envelope: `{ "data": [...] }`. Paging fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Entry of `GET /identity-providers/names`, served without login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginProvider {
    pub name: String,
    #[serde(rename = "type", default)]
    pub provider_type: Option<String>,
}

/// A remedy the client offers when a condition evaluates false.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemedyMethod {
    #[serde(rename = "type")]
    pub method_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// Condition object as the controller stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub expression: String,
    #[serde(default)]
    pub repeat_schedules: BTreeSet<String>,
    #[serde(default)]
    pub remedy_methods: Vec<RemedyMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remedy_logic: Option<String>,
}

/// Credentials baked into an exported appliance seed.
///
/// Holds borrowed secrets; deliberately not `Debug`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<&'a str>,
}

/// `POST /appliances/{id}/export` body.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest<'a> {
    #[serde(rename = "provideCloudSSHKey")]
    pub provide_cloud_ssh_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_config: Option<SshConfig<'a>>,
    pub allow_customization: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<u32>,
    pub latest_version: bool,
}
