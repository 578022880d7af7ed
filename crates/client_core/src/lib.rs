//! Client-side orchestration for a paginated network-interface table.
//!
//! Two controllers cooperate over a shared table handle: [`enrichment::ColumnEnrichmentController`]
//! fills visible dynamic columns (traffic sparklines, last-used stamps) by
//! chaining fetches against the inventory API, and [`filter::FilterController`]
//! maps an explicit filter state to the request URL the table loads its rows
//! from. The table widget and the REST API are collaborators behind traits.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use url::Url;

use shared::domain::InterfaceId;
use shared::protocol::{
    InterfacePage, LastUsedResponse, MetricRecord, MetricSeries, NetboxSuggestion,
};

pub mod api;
pub mod enrichment;
pub mod error;
pub mod filter;
pub mod table;

pub use api::HttpInventoryApi;
pub use enrichment::{ColumnEnrichmentController, EnrichmentEvent, LastUsedStamp};
pub use error::EnrichmentError;
pub use filter::{FilterChange, FilterController, FilterEvent, FilterState, SearchKey};
pub use table::{CellContent, CellState, ColumnKind, MemoryTable, TableHandle, COLUMN_ACTIONS};

/// Read-only surface of the inventory REST API, one method per endpoint the
/// controllers consume.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// `GET /api/interface/{id}/metrics/`
    async fn interface_metrics(&self, interface: InterfaceId) -> Result<Vec<MetricRecord>>;
    /// `GET /api/interface/{id}/last_used/`
    async fn interface_last_used(&self, interface: InterfaceId) -> Result<LastUsedResponse>;
    /// `GET` on a rewritten metric URL, expecting data-format series.
    async fn fetch_series(&self, url: &Url) -> Result<Vec<MetricSeries>>;
    /// `GET /api/netbox/?search={term}`
    async fn search_netboxes(&self, term: &str) -> Result<Vec<NetboxSuggestion>>;
    /// `GET` on a fully-built interface-list URL.
    async fn fetch_interfaces(&self, url: &Url) -> Result<InterfacePage>;
}

/// Placeholder backend for controllers constructed before the API is wired.
pub struct MissingInventoryApi;

#[async_trait]
impl InventoryApi for MissingInventoryApi {
    async fn interface_metrics(&self, interface: InterfaceId) -> Result<Vec<MetricRecord>> {
        Err(anyhow!(
            "inventory api unavailable: metrics for interface {}",
            interface.0
        ))
    }

    async fn interface_last_used(&self, interface: InterfaceId) -> Result<LastUsedResponse> {
        Err(anyhow!(
            "inventory api unavailable: last_used for interface {}",
            interface.0
        ))
    }

    async fn fetch_series(&self, url: &Url) -> Result<Vec<MetricSeries>> {
        Err(anyhow!("inventory api unavailable: series at {url}"))
    }

    async fn search_netboxes(&self, term: &str) -> Result<Vec<NetboxSuggestion>> {
        Err(anyhow!("inventory api unavailable: netbox search {term:?}"))
    }

    async fn fetch_interfaces(&self, url: &Url) -> Result<InterfacePage> {
        Err(anyhow!("inventory api unavailable: interface list at {url}"))
    }
}
