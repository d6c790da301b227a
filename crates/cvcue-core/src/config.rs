// ── Runtime connection configuration ──
//
// Describes how to reach one CV-CUE tenant and where its session lives.
// Never touches disk: the config crate builds a `ClientConfig` and hands
// it in.

use std::path::PathBuf;
use std::time::Duration;

use cvcue_api::{ApiKeyCredentials, CueClient, TransportConfig};
use url::Url;

use crate::remote::CueAuthenticator;
use crate::session::{DEFAULT_SAFETY_MARGIN, SessionOwner, SessionStore};

/// Everything needed to authenticate and list devices.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://tenant.wifi.arista.com/wifi/api`.
    pub base_url: Url,
    pub credentials: ApiKeyCredentials,
    pub transport: TransportConfig,
    /// Session cache file.
    pub session_file: PathBuf,
    /// Head-room before expiry at which a cached session is replaced.
    pub safety_margin: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url, credentials: ApiKeyCredentials, session_file: PathBuf) -> Self {
        Self {
            base_url,
            credentials,
            transport: TransportConfig::default(),
            session_file,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }

    /// Session cache that only reuses sessions issued to this client and
    /// tenant.
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(&self.session_file)
            .with_safety_margin(self.safety_margin)
            .with_owner(SessionOwner::new(
                &self.credentials.client_id,
                self.base_url.as_str(),
            ))
    }

    pub fn client(&self) -> Result<CueClient, cvcue_api::Error> {
        CueClient::new(self.base_url.as_str(), &self.transport)
    }

    pub fn authenticator(&self, client: CueClient) -> CueAuthenticator {
        CueAuthenticator::new(client, self.credentials.clone())
    }
}
