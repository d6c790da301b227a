// cvcue-api: Async Rust client for the Arista CV-CUE REST API

pub mod client;
pub mod devices;
pub mod error;
pub mod session;
pub mod transport;

pub use client::{CueClient, SESSION_COOKIE};
pub use devices::{ApsPage, MANAGED_DEVICES_API_VERSION};
pub use error::Error;
pub use session::{ApiKeyCredentials, DEFAULT_SESSION_TIMEOUT_SECS, SessionGrant};
pub use transport::{TlsMode, TransportConfig};
