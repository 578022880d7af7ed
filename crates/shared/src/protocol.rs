use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{InterfaceId, NetboxId, OperStatus};

/// One row of the interface table, as served by the inventory API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceRow {
    pub id: InterfaceId,
    pub ifname: String,
    pub ifalias: Option<String>,
    pub ifoperstatus: OperStatus,
    pub ifadminstatus: OperStatus,
    pub speed: Option<f64>,
    pub vlan: Option<i32>,
}

/// Paginated envelope around interface rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfacePage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<InterfaceRow>,
}

/// One available time-series for an interface: the metric's trailing name
/// segment plus the URL its graph is rendered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub suffix: String,
    pub url: String,
}

/// A single sample: the wire form is a two-element array
/// `[value | null, timestamp_seconds]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Option<f64>, i64)", into = "(Option<f64>, i64)")]
pub struct Datapoint {
    pub value: Option<f64>,
    pub timestamp: i64,
}

impl From<(Option<f64>, i64)> for Datapoint {
    fn from((value, timestamp): (Option<f64>, i64)) -> Self {
        Self { value, timestamp }
    }
}

impl From<Datapoint> for (Option<f64>, i64) {
    fn from(point: Datapoint) -> Self {
        (point.value, point.timestamp)
    }
}

/// One series from a data-format graph query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub target: String,
    pub datapoints: Vec<Datapoint>,
}

/// Answer to a last-used lookup. `None` means no usage interval was ever
/// recorded for the interface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LastUsedResponse {
    pub last_used: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetboxSuggestion {
    pub id: NetboxId,
    pub sysname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetboxSearchResponse {
    pub results: Vec<NetboxSuggestion>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
