// ── Managed object kinds ──
//
// The closed set of object kinds the engine can reconcile, with the REST
// routing facts each one needs. Attribute schemas are deliberately absent:
// adapters treat payloads as opaque attribute maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Where a kind lives in the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST path`, then `GET|PUT|DELETE path/{id}`. The id is read from
    /// `id_field` of the stored object.
    Collection {
        path: &'static str,
        id_field: &'static str,
    },
    /// Exactly one instance at `path`; create and update are both `PUT`,
    /// delete resets it to controller defaults.
    Singleton { path: &'static str },
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Collection { path, .. } | Self::Singleton { path } => path,
        }
    }
}

const fn collection(path: &'static str) -> Route {
    Route::Collection {
        path,
        id_field: "id",
    }
}

/// Every kind of object the engine manages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Appliance,
    Entitlement,
    Site,
    RingfenceRule,
    Condition,
    Policy,
    CriteriaScript,
    EntitlementScript,
    DeviceScript,
    ApplianceCustomization,
    IpPool,
    AdministrativeRole,
    GlobalSettings,
    LdapIdentityProvider,
    TrustedCertificate,
    MfaProvider,
    LocalUser,
    License,
    AdminMfaSettings,
    ClientConnections,
    BlacklistUser,
    RadiusIdentityProvider,
    SamlIdentityProvider,
    LocalDatabaseIdentityProvider,
    LdapCertificateIdentityProvider,
    ConnectorIdentityProvider,
}

impl ResourceKind {
    /// All kinds in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Host-facing type name, e.g. `appgate_condition`.
    pub fn type_name(self) -> String {
        format!("appgate_{self}")
    }

    /// Parse a host-facing type name back into a kind.
    pub fn from_type_name(name: &str) -> Option<Self> {
        name.strip_prefix("appgate_")?.parse().ok()
    }

    pub fn route(self) -> Route {
        match self {
            Self::Appliance => collection("appliances"),
            Self::Entitlement => collection("entitlements"),
            Self::Site => collection("sites"),
            Self::RingfenceRule => collection("ringfence-rules"),
            Self::Condition => collection("conditions"),
            Self::Policy => collection("policies"),
            Self::CriteriaScript => collection("criteria-scripts"),
            Self::EntitlementScript => collection("entitlement-scripts"),
            Self::DeviceScript => collection("device-scripts"),
            Self::ApplianceCustomization => collection("appliance-customizations"),
            Self::IpPool => collection("ip-pools"),
            Self::AdministrativeRole => collection("administrative-roles"),
            Self::TrustedCertificate => collection("trusted-certificates"),
            Self::MfaProvider => collection("mfa-providers"),
            Self::LocalUser => collection("local-users"),
            Self::License => collection("license"),
            Self::LdapIdentityProvider
            | Self::RadiusIdentityProvider
            | Self::SamlIdentityProvider
            | Self::LocalDatabaseIdentityProvider
            | Self::LdapCertificateIdentityProvider
            | Self::ConnectorIdentityProvider => collection("identity-providers"),
            Self::BlacklistUser => Route::Collection {
                path: "blacklist",
                id_field: "userDistinguishedName",
            },
            Self::GlobalSettings => Route::Singleton {
                path: "global-settings",
            },
            Self::AdminMfaSettings => Route::Singleton {
                path: "admin-mfa-settings",
            },
            Self::ClientConnections => Route::Singleton {
                path: "client-connections",
            },
        }
    }

    pub fn is_singleton(self) -> bool {
        matches!(self.route(), Route::Singleton { .. })
    }

    /// Discriminator attributes (wire names) the controller needs to tell
    /// kinds sharing one collection apart.
    pub fn fixed_attributes(self) -> Map<String, Value> {
        let provider_type = match self {
            Self::LdapIdentityProvider => "Ldap",
            Self::RadiusIdentityProvider => "Radius",
            Self::SamlIdentityProvider => "Saml",
            Self::LocalDatabaseIdentityProvider => "LocalDatabase",
            Self::LdapCertificateIdentityProvider => "LdapCertificate",
            Self::ConnectorIdentityProvider => "Connector",
            _ => return Map::new(),
        };
        let mut attrs = Map::new();
        attrs.insert("type".into(), json!(provider_type));
        attrs
    }

    /// Whether hosts may also read this kind as a data source, finding one
    /// existing object by name or id.
    pub fn has_data_source(self) -> bool {
        !matches!(
            self,
            Self::LdapIdentityProvider
                | Self::RadiusIdentityProvider
                | Self::SamlIdentityProvider
                | Self::LocalDatabaseIdentityProvider
                | Self::LdapCertificateIdentityProvider
                | Self::ConnectorIdentityProvider
                | Self::License
                | Self::AdminMfaSettings
                | Self::ClientConnections
                | Self::BlacklistUser
        )
    }

    /// First API revision that serves this kind.
    pub fn introduced_in(self) -> u32 {
        match self {
            Self::ConnectorIdentityProvider => 15,
            _ => appgate_api::ApiVersion::oldest().get(),
        }
    }
}
