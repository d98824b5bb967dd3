// API version negotiation
//
// The controller serves several incompatible peer API revisions side by
// side, selected by the `Accept` media type. A `ClientSurface` pins one
// revision for the lifetime of a session.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::Error;

/// Every client version this crate knows how to speak.
pub const SUPPORTED_VERSIONS: RangeInclusive<u32> = 12..=16;

/// Version used when configuration does not say otherwise.
pub const DEFAULT_CLIENT_VERSION: u32 = 14;

/// A supported peer API revision. Only constructible through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion(u32);

impl ApiVersion {
    /// The newest supported revision.
    pub const fn latest() -> Self {
        Self(*SUPPORTED_VERSIONS.end())
    }

    /// The oldest supported revision.
    pub const fn oldest() -> Self {
        Self(*SUPPORTED_VERSIONS.start())
    }

    pub fn new(requested: u32) -> Result<Self, Error> {
        if SUPPORTED_VERSIONS.contains(&requested) {
            Ok(Self(requested))
        } else {
            Err(Error::UnsupportedVersion {
                requested,
                latest: Self::latest().get(),
            })
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// All supported revisions, oldest first.
    pub fn all() -> impl Iterator<Item = Self> {
        SUPPORTED_VERSIONS.map(Self)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The operation set and payload conventions of one API revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSurface {
    version: ApiVersion,
}

impl ClientSurface {
    /// Resolve a requested version to its surface.
    ///
    /// `None` selects the newest revision. An explicit unsupported value is
    /// a configuration error and never yields a partially usable surface.
    pub fn resolve(requested: Option<u32>) -> Result<Self, Error> {
        let version = match requested {
            Some(v) => ApiVersion::new(v)?,
            None => ApiVersion::latest(),
        };
        Ok(Self { version })
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Media type sent in `Accept` on every request of this revision.
    pub fn media_type(&self) -> String {
        format!("application/vnd.appgate.peer-v{}+json", self.version.get())
    }

    /// Whether something introduced in revision `since` exists on this surface.
    pub fn supports(&self, since: u32) -> bool {
        self.version.get() >= since
    }
}
