// ── HTTP-backed capabilities ──
//
// Binds the engine's `Authenticator` and `PageFetcher` seams to the
// CV-CUE REST client.

use cvcue_api::{ApiKeyCredentials, CueClient};
use tracing::info;

use crate::error::AuthError;
use crate::paginator::PageFetcher;
use crate::query::QuerySpec;
use crate::record::{DeviceRecord, FetchedPage};
use crate::session::{Authenticator, Session};

/// Logs in with an API key through `POST /session`.
#[derive(Debug, Clone)]
pub struct CueAuthenticator {
    client: CueClient,
    credentials: ApiKeyCredentials,
}

impl CueAuthenticator {
    pub fn new(client: CueClient, credentials: ApiKeyCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn client(&self) -> &CueClient {
        &self.client
    }
}

impl Authenticator for CueAuthenticator {
    async fn authenticate(&self) -> Result<Session, AuthError> {
        let grant = self
            .client
            .login(&self.credentials)
            .await
            .map_err(|e| AuthError::from_api(e, self.client.base_url()))?;
        info!("login response: {}", grant.body);
        Ok(Session::from_grant(&grant, &self.credentials.client_id)
            .with_base_url(self.client.base_url().as_str()))
    }
}

impl PageFetcher for CueClient {
    async fn fetch_page(
        &self,
        session: &Session,
        query: &QuerySpec,
    ) -> Result<FetchedPage, cvcue_api::Error> {
        let page = self.list_aps(session.token(), &query.to_params()).await?;
        Ok(FetchedPage {
            records: page
                .managed_devices
                .into_iter()
                .map(DeviceRecord::from)
                .collect(),
            total_count: page.total_count,
        })
    }
}
