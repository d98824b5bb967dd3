// ── Remote identity ──
//
// The controller assigns a UUID to most objects on creation. A few kinds
// are keyed differently: blocklisted users by distinguished name, and the
// settings singletons have exactly one instance per controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use uuid::Uuid;

/// Canonical identifier for a managed object on the controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Uuid(Uuid),
    Named(String),
}

impl Identity {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Named(_) => None,
        }
    }

    /// The path segment addressing this object, percent-encoded so that
    /// reserved characters in a name (`/`, `?`, `#`, `%`) stay in the path.
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Uuid(u) => u.to_string(),
            // form encoding writes spaces as `+`, which a path keeps literally
            Self::Named(s) => form_urlencoded::byte_serialize(s.as_bytes())
                .map(|chunk| if chunk == "+" { "%20" } else { chunk })
                .collect(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Named(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for Identity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for Identity {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Named(s),
        }
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}
