// CV-CUE REST client
//
// Wraps `reqwest::Client` with base-URL handling, session-cookie
// injection, and response decoding. Endpoint groups (session, managed
// devices) are inherent methods in their own files so this module stays
// focused on transport mechanics.

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Name of the session cookie set by `POST /session`.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Async HTTP client for a CV-CUE API root (e.g. `https://host/wifi/api`).
///
/// Holds no session state of its own: callers pass the session token on
/// each data request, which keeps the decision of *when* to log in out of
/// the transport layer.
#[derive(Debug, Clone)]
pub struct CueClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CueClient {
    /// Build a client from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The API root, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the path ends with exactly one `/` so relative joins append
    /// instead of replacing the last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint path (e.g. `"manageddevices/aps"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Headers ──────────────────────────────────────────────────────

    /// Default headers for every CV-CUE call. The API insists on a JSON
    /// content type even for body-less GETs.
    pub(crate) fn base_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Headers for a session-authenticated request.
    pub(crate) fn session_headers(token: &SecretString) -> Result<HeaderMap, Error> {
        let mut headers = Self::base_headers();
        let mut cookie =
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", token.expose_secret()))
                .map_err(|_| Error::InvalidHeader { name: "Cookie" })?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);
        Ok(headers)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Authenticated GET with query parameters, decoding a JSON body.
    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
        extra_headers: HeaderMap,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let mut headers = Self::session_headers(token)?;
        headers.extend(extra_headers);

        let resp = self
            .http
            .get(url)
            .headers(headers)
            .query(params)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    pub(crate) async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::SessionExpired;
        }

        let raw = resp.text().await.unwrap_or_default();
        Error::Api {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        }
    }
}
