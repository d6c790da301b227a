// Session exchange
//
// `POST /session` trades an API key for a `JSESSIONID` cookie;
// `GET /session` answers 200 while that cookie is still honoured.

use reqwest::header::SET_COOKIE;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::client::{CueClient, SESSION_COOKIE};
use crate::error::Error;

/// Session lifetime requested when the caller doesn't specify one.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 300;

/// API-key credentials for the session exchange.
#[derive(Debug, Clone)]
pub struct ApiKeyCredentials {
    pub key_id: String,
    pub key_value: SecretString,
    pub client_id: String,
    /// Idle timeout requested for the new session, in seconds.
    pub timeout_secs: u64,
}

/// What a successful login hands back.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    /// Value of the `JSESSIONID` cookie.
    pub token: SecretString,
    /// Session lifetime the server was asked for.
    pub timeout_secs: u64,
    /// Decoded response body (empty object when the server sent none).
    pub body: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    key_id: &'a str,
    key_value: &'a str,
    client_identifier: &'a str,
    timeout: u64,
}

impl CueClient {
    /// Exchange API-key credentials for a new session.
    ///
    /// A 401/403 is a credential rejection; any other non-success status
    /// is reported as an API error so callers can tell the two apart.
    pub async fn login(&self, creds: &ApiKeyCredentials) -> Result<SessionGrant, Error> {
        let url = self.url("session")?;
        debug!("logging in at {url} as client {}", creds.client_id);

        let body = LoginBody {
            kind: "apiKeyCredentials",
            key_id: &creds.key_id,
            key_value: creds.key_value.expose_secret(),
            client_identifier: &creds.client_id,
            timeout: creds.timeout_secs,
        };

        let resp = self.http().post(url).json(&body).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                status: status.as_u16(),
                message: if body.is_empty() {
                    "credentials rejected".into()
                } else {
                    body
                },
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        let token = session_cookie(resp.headers()).ok_or(Error::MissingSessionCookie)?;

        let raw = resp.text().await?;
        let body = if raw.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
        };

        debug!("login successful");
        Ok(SessionGrant {
            token: SecretString::from(token),
            timeout_secs: creds.timeout_secs,
            body,
        })
    }

    /// Ask the server whether a session token is still honoured.
    ///
    /// Any non-200 status means "not active"; only transport failures
    /// surface as errors.
    pub async fn session_active(&self, token: &SecretString) -> Result<bool, Error> {
        let url = self.url("session")?;
        debug!("checking session status at {url}");

        let resp = self
            .http()
            .get(url)
            .headers(Self::session_headers(token)?)
            .send()
            .await?;

        let active = resp.status() == reqwest::StatusCode::OK;
        debug!(status = resp.status().as_u16(), active, "session probe");
        Ok(active)
    }
}

/// Pull the `JSESSIONID` value out of the `Set-Cookie` headers.
fn session_cookie(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            let (name, value) = pair.split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_owned())
        })
}
