// Managed devices (access points)
//
// `GET /manageddevices/aps` returns one page of access points addressed
// by `startindex` + `pagesize`. The query itself is composed upstream;
// this layer only carries it over the wire.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::client::CueClient;
use crate::error::Error;

/// API version the managed-devices endpoints are pinned to.
pub const MANAGED_DEVICES_API_VERSION: &str = "19";

/// One page from `GET /manageddevices/aps`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApsPage {
    /// Device objects, passed through untouched.
    #[serde(default)]
    pub managed_devices: Vec<serde_json::Map<String, serde_json::Value>>,
    /// Only populated when `totalcountrequired=true` was sent.
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl CueClient {
    /// Fetch one page of managed access points.
    pub async fn list_aps(
        &self,
        token: &SecretString,
        params: &[(&str, String)],
    ) -> Result<ApsPage, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Version",
            HeaderValue::from_static(MANAGED_DEVICES_API_VERSION),
        );
        self.get_with_params("manageddevices/aps", token, headers, params)
            .await
    }
}
