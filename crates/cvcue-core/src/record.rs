// ── Records and page results ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field carrying the device's display name.
pub const NAME_FIELD: &str = "name";
/// Field carrying the device's MAC address.
pub const MAC_FIELD: &str = "macaddress";

/// One managed device as returned by the API.
///
/// Opaque: the engine never rewrites a record, it only reads fields for
/// projection and local filter evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRecord(Map<String, Value>);

impl DeviceRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Display name, if present and a string.
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD).and_then(Value::as_str)
    }

    /// MAC address, if present and a string.
    pub fn mac(&self) -> Option<&str> {
        self.get(MAC_FIELD).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for DeviceRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One page as delivered by a fetcher, before the paginator judges it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    pub records: Vec<DeviceRecord>,
    pub total_count: Option<u64>,
}

/// One page after the paginator has looked at it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub records: Vec<DeviceRecord>,
    pub total_count: Option<u64>,
    /// The page came back full, so another page may follow.
    pub has_more: bool,
}

/// Every record of a full sweep, in fetch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResult {
    pub records: Vec<DeviceRecord>,
    /// Last total the server reported during the sweep, if any.
    pub total_count: Option<u64>,
    /// Number of page requests issued.
    pub pages: usize,
}
