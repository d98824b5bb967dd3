// ── Data sources ──
//
// Read-only views of the controller. Most mirror a managed kind and pick
// one existing object by name or id. Three have no managed counterpart:
// identity providers of any type, the certificate authority, and seed
// files for appliances that have not joined yet.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use appgate_api::models::{SeedRequest, SshConfig};

use crate::adapter::CoreResult;
use crate::error::{CoreError, Operation};
use crate::model::{Identity, ObservedState, ResourceKind, from_wire};
use crate::provider::Provider;

const IDENTITY_PROVIDERS: &str = "identity-providers";

/// Everything a host can read without managing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// One existing object of a managed kind.
    Kind(ResourceKind),
    /// Any identity provider, whatever its type.
    IdentityProvider,
    ApplianceSeed,
    CertificateAuthority,
}

impl DataSource {
    pub fn all() -> impl Iterator<Item = Self> {
        ResourceKind::all()
            .filter(|kind| kind.has_data_source())
            .map(Self::Kind)
            .chain([
                Self::IdentityProvider,
                Self::ApplianceSeed,
                Self::CertificateAuthority,
            ])
    }

    /// Host-facing type name, e.g. `appgate_certificate_authority`.
    pub fn type_name(self) -> String {
        match self {
            Self::Kind(kind) => kind.type_name(),
            Self::IdentityProvider => "appgate_identity_provider".into(),
            Self::ApplianceSeed => "appgate_appliance_seed".into(),
            Self::CertificateAuthority => "appgate_certificate_authority".into(),
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::all().find(|source| source.type_name() == name)
    }
}

/// How an exported seed lets the operator into the new appliance.
///
/// At least one of `password`, `ssh_key` or `provide_cloud_ssh_key` is
/// required.
#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    pub password: Option<SecretString>,
    pub ssh_key: Option<String>,
    /// Use the key the cloud provider injects instead.
    pub provide_cloud_ssh_key: bool,
    pub allow_customization: bool,
    pub validity_days: Option<u32>,
    /// Seed for the newest appliance release rather than the controller's.
    pub latest_version: bool,
}

impl SeedOptions {
    fn request(&self) -> CoreResult<SeedRequest<'_>> {
        let password = self.password.as_ref().map(ExposeSecret::expose_secret);
        let ssh_key = self.ssh_key.as_deref();
        if password.is_none() && ssh_key.is_none() && !self.provide_cloud_ssh_key {
            return Err(CoreError::InvalidDeclaration {
                kind: DataSource::ApplianceSeed.type_name(),
                message: "one of password, ssh_key or provide_cloud_ssh_key is required".into(),
            });
        }
        let ssh_config = (password.is_some() || ssh_key.is_some())
            .then_some(SshConfig { password, ssh_key });
        Ok(SeedRequest {
            provide_cloud_ssh_key: self.provide_cloud_ssh_key,
            ssh_config,
            allow_customization: self.allow_customization,
            validity_days: self.validity_days,
            latest_version: self.latest_version,
        })
    }
}

/// A seed file as the controller exported it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceSeed {
    pub appliance: Identity,
    /// Passed to the appliance unchanged, so keys keep their wire casing.
    pub seed: Value,
}

impl ApplianceSeed {
    pub fn to_file_contents(&self) -> String {
        self.seed.to_string()
    }
}

impl Provider {
    /// The single object of `kind` selected by UUID or exact name.
    pub async fn read_data(
        &self,
        kind: ResourceKind,
        selector: &Identity,
    ) -> CoreResult<(Identity, ObservedState)> {
        if !kind.has_data_source() {
            return Err(CoreError::InvalidDeclaration {
                kind: kind.type_name(),
                message: "no data source for this kind".into(),
            });
        }
        let adapter = self.adapter(kind)?;
        match selector {
            Identity::Uuid(_) => {
                let observed = adapter.read(self.session(), selector).await?;
                Ok((selector.clone(), observed))
            }
            Identity::Named(name) => single(
                kind.type_name(),
                name,
                adapter.lookup(self.session(), name).await?,
            ),
        }
    }

    /// An identity provider of any type, selected by UUID or exact name.
    pub async fn identity_provider(
        &self,
        selector: &Identity,
    ) -> CoreResult<(Identity, ObservedState)> {
        let source = DataSource::IdentityProvider.type_name();
        let session = self.session();
        match selector {
            Identity::Uuid(_) => {
                let path = format!("{IDENTITY_PROVIDERS}/{}", selector.to_path_segment());
                let stored = session.get_object(&path).await.map_err(|e| {
                    CoreError::from_api_named(e, source.clone(), Operation::Read, Some(selector))
                })?;
                Ok((selector.clone(), observed(&source, stored)?))
            }
            Identity::Named(name) => {
                let listed = session
                    .list_objects(IDENTITY_PROVIDERS, Some(name))
                    .await
                    .map_err(|e| {
                        CoreError::from_api_named(e, source.clone(), Operation::Lookup, None)
                    })?;
                let mut found = Vec::new();
                for stored in listed {
                    if stored.get("name").and_then(Value::as_str) != Some(name.as_str()) {
                        continue;
                    }
                    let Some(id) = stored.get("id").and_then(Value::as_str).map(Identity::from)
                    else {
                        continue;
                    };
                    found.push((id, observed(&source, stored)?));
                }
                single(source, name, found)
            }
        }
    }

    /// The certificate authority the controller currently signs with.
    pub async fn certificate_authority(&self) -> CoreResult<ObservedState> {
        let source = DataSource::CertificateAuthority.type_name();
        let stored = self
            .session()
            .certificate_authority()
            .await
            .map_err(|e| CoreError::from_api_named(e, source.clone(), Operation::Read, None))?;
        observed(&source, stored)
    }

    /// Export a seed file for an appliance that has not joined yet.
    pub async fn appliance_seed(
        &self,
        appliance: &Identity,
        options: &SeedOptions,
    ) -> CoreResult<ApplianceSeed> {
        let request = options.request()?;
        debug!(%appliance, "exporting seed");
        let seed = self
            .session()
            .export_seed(&appliance.to_path_segment(), &request)
            .await
            .map_err(|e| {
                CoreError::from_api_named(
                    e,
                    DataSource::ApplianceSeed.type_name(),
                    Operation::Read,
                    Some(appliance),
                )
            })?;
        Ok(ApplianceSeed {
            appliance: appliance.clone(),
            seed,
        })
    }
}

fn observed(source: &str, stored: Value) -> CoreResult<ObservedState> {
    match stored {
        Value::Object(map) => Ok(ObservedState::new(from_wire(&map))),
        other => Err(CoreError::Remote {
            kind: source.to_owned(),
            operation: Operation::Read,
            identity: String::new(),
            message: format!("expected a JSON object, got {other}"),
            status: None,
        }),
    }
}

/// Exactly one match, or an error naming what went wrong.
fn single(
    kind: String,
    name: &str,
    mut found: Vec<(Identity, ObservedState)>,
) -> CoreResult<(Identity, ObservedState)> {
    if found.len() > 1 {
        return Err(CoreError::InvalidDeclaration {
            kind,
            message: format!("{} objects are named {name}; select one by id", found.len()),
        });
    }
    found.pop().ok_or_else(|| CoreError::NotFound {
        kind,
        identity: name.to_owned(),
    })
}
