// ── Result projection ──
//
// Reduces a record set into one of the renderable shapes. Pure: the
// projector formats nothing for a terminal, it only picks fields.

use serde_json::Value;
use strum::{Display, EnumString};
use tracing::warn;

use crate::record::{DeviceRecord, MAC_FIELD, NAME_FIELD};

/// Where the number for `count` comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CountSource {
    /// Records actually received.
    #[default]
    Local,
    /// The server's `totalCount`, falling back to the local count.
    Server,
}

/// Requested projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Raw,
    Table,
    Compact,
    Count(CountSource),
}

/// One fixed table column over a well-known record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableColumn {
    pub header: &'static str,
    pub field: &'static str,
}

/// Column set of the device table, in display order.
pub const DEVICE_COLUMNS: [TableColumn; 6] = [
    TableColumn {
        header: "Name",
        field: NAME_FIELD,
    },
    TableColumn {
        header: "Model",
        field: "model",
    },
    TableColumn {
        header: "MAC",
        field: MAC_FIELD,
    },
    TableColumn {
        header: "IP",
        field: "ipaddress",
    },
    TableColumn {
        header: "Active",
        field: "active",
    },
    TableColumn {
        header: "Box ID",
        field: "boxid",
    },
];

/// Tabular projection: every row has one cell per `DEVICE_COLUMNS` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTable {
    pub rows: Vec<Vec<String>>,
}

impl DeviceTable {
    pub fn headers() -> impl Iterator<Item = &'static str> {
        DEVICE_COLUMNS.iter().map(|c| c.header)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactLine {
    pub name: String,
    pub mac: String,
}

/// Name/MAC listing plus how many records lacked one of the two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactListing {
    pub lines: Vec<CompactLine>,
    pub skipped: usize,
}

/// What a command hands to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderableOutput {
    Raw(Vec<DeviceRecord>),
    Table(DeviceTable),
    Compact(CompactListing),
    Count(u64),
}

/// Project `records` into `mode`. `server_total` is only consulted for
/// `Count(Server)`.
pub fn project(
    records: Vec<DeviceRecord>,
    server_total: Option<u64>,
    mode: ProjectionMode,
) -> RenderableOutput {
    match mode {
        ProjectionMode::Raw => RenderableOutput::Raw(records),
        ProjectionMode::Table => RenderableOutput::Table(table(&records)),
        ProjectionMode::Compact => RenderableOutput::Compact(compact(&records)),
        ProjectionMode::Count(source) => RenderableOutput::Count(count(&records, server_total, source)),
    }
}

pub fn table(records: &[DeviceRecord]) -> DeviceTable {
    DeviceTable {
        rows: records
            .iter()
            .map(|r| {
                DEVICE_COLUMNS
                    .iter()
                    .map(|c| r.get(c.field).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect(),
    }
}

pub fn compact(records: &[DeviceRecord]) -> CompactListing {
    let mut listing = CompactListing::default();
    for record in records {
        match (record.name(), record.mac()) {
            (Some(name), Some(mac)) => listing.lines.push(CompactLine {
                name: name.to_owned(),
                mac: mac.to_owned(),
            }),
            _ => listing.skipped += 1,
        }
    }
    if listing.skipped > 0 {
        warn!(
            "{} record(s) without a name or MAC address left out",
            listing.skipped
        );
    }
    listing
}

pub fn count(records: &[DeviceRecord], server_total: Option<u64>, source: CountSource) -> u64 {
    let local = u64::try_from(records.len()).unwrap_or(u64::MAX);
    match source {
        CountSource::Local => local,
        CountSource::Server => server_total.unwrap_or(local),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn records() -> Vec<DeviceRecord> {
        [
            json!({"name": "AP-1", "macaddress": "AA:BB", "model": "AP-555", "active": true, "boxid": 123, "ipaddress": "10.0.0.1"}),
            json!({"name": "AP-2", "model": "AP-635"}),
            json!({"macaddress": "CC:DD"}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).expect("object"))
        .collect()
    }

    #[test]
    fn raw_is_passthrough() {
        let recs = records();
        assert_eq!(
            project(recs.clone(), None, ProjectionMode::Raw),
            RenderableOutput::Raw(recs)
        );
    }

    #[test]
    fn table_has_fixed_columns_and_blank_gaps() {
        let table = table(&records());
        assert_eq!(
            DeviceTable::headers().collect::<Vec<_>>(),
            vec!["Name", "Model", "MAC", "IP", "Active", "Box ID"]
        );
        assert_eq!(
            table.rows[0],
            vec!["AP-1", "AP-555", "AA:BB", "10.0.0.1", "true", "123"]
        );
        assert_eq!(table.rows[1], vec!["AP-2", "AP-635", "", "", "", ""]);
        assert!(table.rows.iter().all(|r| r.len() == DEVICE_COLUMNS.len()));
    }

    #[test]
    fn compact_skips_incomplete_records() {
        let listing = compact(&records());
        assert_eq!(
            listing.lines,
            vec![CompactLine {
                name: "AP-1".into(),
                mac: "AA:BB".into()
            }]
        );
        assert_eq!(listing.skipped, 2);
    }

    #[test]
    fn count_is_local_unless_server_requested() {
        let recs = records();
        assert_eq!(count(&recs, Some(250), CountSource::Local), 3);
        assert_eq!(count(&recs, Some(250), CountSource::Server), 250);
        assert_eq!(count(&recs, None, CountSource::Server), 3);
    }
}
