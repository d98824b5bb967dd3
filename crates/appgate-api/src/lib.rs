// appgate-api: Async Rust client for the Appgate SDP admin API

pub mod auth;
pub mod diagnostic;
pub mod error;
pub mod models;
pub mod transport;
pub mod version;

mod conditions;
mod exports;
mod request;
mod resources;
mod session;

pub use auth::{Credentials, DEFAULT_IDENTITY_PROVIDER, Token};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{Error, FieldError};
pub use session::{Established, Session, UNAUTHENTICATED_SUMMARY};
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
pub use version::{ApiVersion, ClientSurface, DEFAULT_CLIENT_VERSION, SUPPORTED_VERSIONS};
