use super::*;
use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use tokio::net::TcpListener;

use shared::domain::{NetboxId, OperStatus};
use shared::protocol::{Datapoint, InterfaceRow};

async fn serve(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    Url::parse(&format!("http://{addr}/")).expect("base url")
}

async fn metrics_handler(Path(id): Path<i64>) -> Json<Vec<MetricRecord>> {
    Json(vec![MetricRecord {
        suffix: "ifOutOctets".to_string(),
        url: format!("http://graphite.example/render/?target=nav.{id}&height=50"),
    }])
}

async fn last_used_handler(Path(_id): Path<i64>) -> Json<LastUsedResponse> {
    Json(LastUsedResponse {
        last_used: NaiveDate::from_ymd_opt(2023, 5, 17)
            .expect("date")
            .and_hms_opt(8, 30, 0),
    })
}

async fn series_handler() -> Json<Vec<MetricSeries>> {
    Json(vec![MetricSeries {
        target: "nav.42.ifOutOctets".to_string(),
        datapoints: vec![
            Datapoint::from((Some(1.5), 1_700_000_000)),
            Datapoint::from((None, 1_700_000_060)),
        ],
    }])
}

async fn netbox_handler(
    Query(params): Query<HashMap<String, String>>,
) -> Json<NetboxSearchResponse> {
    assert_eq!(params.get("search").map(String::as_str), Some("sw"));
    Json(NetboxSearchResponse {
        results: vec![NetboxSuggestion {
            id: NetboxId(3),
            sysname: "sw-core.example.org".to_string(),
        }],
    })
}

async fn interface_list_handler() -> Json<InterfacePage> {
    Json(InterfacePage {
        count: 1,
        next: None,
        previous: None,
        results: vec![InterfaceRow {
            id: InterfaceId(42),
            ifname: "Gi1/0/42".to_string(),
            ifalias: Some("uplink".to_string()),
            ifoperstatus: OperStatus::Up,
            ifadminstatus: OperStatus::Up,
            speed: Some(1000.0),
            vlan: Some(20),
        }],
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_and_decodes_interface_metrics() {
    let app = Router::new().route("/api/interface/:id/metrics/", get(metrics_handler));
    let api = HttpInventoryApi::new(serve(app).await);

    let metrics = api
        .interface_metrics(InterfaceId(42))
        .await
        .expect("metrics");
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].suffix, "ifOutOctets");
    assert!(metrics[0].url.contains("nav.42"));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_and_decodes_last_used() {
    let app = Router::new().route("/api/interface/:id/last_used/", get(last_used_handler));
    let api = HttpInventoryApi::new(serve(app).await);

    let response = api
        .interface_last_used(InterfaceId(42))
        .await
        .expect("last used");
    let stamp = response.last_used.expect("timestamp");
    assert_eq!(stamp.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-05-17 08:30:00");
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_series_from_an_arbitrary_url() {
    let app = Router::new().route("/render/", get(series_handler));
    let base = serve(app).await;
    let api = HttpInventoryApi::new(base.clone());

    let url = base.join("render/?target=nav.42&format=json").expect("url");
    let series = api.fetch_series(&url).await.expect("series");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].datapoints[0].value, Some(1.5));
    assert_eq!(series[0].datapoints[1].value, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn netbox_search_sends_the_term_and_unwraps_results() {
    let app = Router::new().route("/api/netbox/", get(netbox_handler));
    let api = HttpInventoryApi::new(serve(app).await);

    let results = api.search_netboxes("sw").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, NetboxId(3));
    assert_eq!(results[0].sysname, "sw-core.example.org");
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_an_interface_page() {
    let app = Router::new().route("/api/1/interface/", get(interface_list_handler));
    let base = serve(app).await;
    let api = HttpInventoryApi::new(base.clone());

    let url = base.join("api/1/interface/?ifoperstatus=1").expect("url");
    let page = api.fetch_interfaces(&url).await.expect("page");
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].id, InterfaceId(42));
    assert!(page.results[0].ifoperstatus.is_up());
}

#[tokio::test(flavor = "multi_thread")]
async fn http_errors_surface_as_failures() {
    let app = Router::new().route(
        "/api/interface/:id/metrics/",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let api = HttpInventoryApi::new(serve(app).await);

    assert!(api.interface_metrics(InterfaceId(1)).await.is_err());
}
