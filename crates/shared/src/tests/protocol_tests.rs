use super::*;
use crate::domain::OperStatus;
use chrono::Datelike;

#[test]
fn datapoint_parses_from_wire_array() {
    let point: Datapoint = serde_json::from_str("[42.7, 1700000000]").expect("datapoint");
    assert_eq!(point.value, Some(42.7));
    assert_eq!(point.timestamp, 1_700_000_000);
}

#[test]
fn datapoint_parses_null_value_as_gap() {
    let point: Datapoint = serde_json::from_str("[null, 1700000060]").expect("datapoint");
    assert_eq!(point.value, None);
}

#[test]
fn metric_series_parses_graphite_shape() {
    let raw = r#"{"target": "ifOutOctets", "datapoints": [[1.0, 10], [null, 20], [3.5, 30]]}"#;
    let series: MetricSeries = serde_json::from_str(raw).expect("series");
    assert_eq!(series.target, "ifOutOctets");
    assert_eq!(series.datapoints.len(), 3);
    assert_eq!(series.datapoints[1].value, None);
}

#[test]
fn oper_status_decodes_snmp_integers() {
    let row: InterfaceRow = serde_json::from_str(
        r#"{"id": 7, "ifname": "Gi1/0/1", "ifalias": null,
            "ifoperstatus": 1, "ifadminstatus": 2, "speed": 1000.0, "vlan": 20}"#,
    )
    .expect("row");
    assert!(row.ifoperstatus.is_up());
    assert_eq!(row.ifadminstatus, OperStatus::Down);
}

#[test]
fn oper_status_keeps_unlisted_codes() {
    let status: OperStatus = serde_json::from_str("5").expect("status");
    assert_eq!(status, OperStatus::Other(5));
    assert_eq!(serde_json::to_string(&status).expect("json"), "5");
}

#[test]
fn last_used_parses_open_ended_sentinel() {
    let response: LastUsedResponse =
        serde_json::from_str(r#"{"last_used": "9999-12-31T23:59:59"}"#).expect("last used");
    assert_eq!(response.last_used.expect("timestamp").year(), 9999);
}

#[test]
fn last_used_parses_null() {
    let response: LastUsedResponse = serde_json::from_str(r#"{"last_used": null}"#).expect("null");
    assert!(response.last_used.is_none());
}

#[test]
fn interface_page_parses_pagination_envelope() {
    let raw = r#"{
        "count": 2,
        "next": "/api/1/interface/?page=2",
        "previous": null,
        "results": [
            {"id": 1, "ifname": "eth0", "ifalias": "uplink",
             "ifoperstatus": 1, "ifadminstatus": 1, "speed": null, "vlan": null}
        ]
    }"#;
    let page: InterfacePage = serde_json::from_str(raw).expect("page");
    assert_eq!(page.count, 2);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].ifname, "eth0");
}
