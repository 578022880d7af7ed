use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use shared::domain::InterfaceId;
use shared::protocol::{
    InterfacePage, LastUsedResponse, MetricRecord, MetricSeries, NetboxSearchResponse,
    NetboxSuggestion,
};

use crate::InventoryApi;

/// Reqwest-backed [`InventoryApi`] against a single API root.
pub struct HttpInventoryApi {
    http: Client,
    api_root: Url,
}

impl HttpInventoryApi {
    pub fn new(api_root: Url) -> Self {
        Self {
            http: Client::new(),
            api_root,
        }
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_root
            .join(path)
            .with_context(|| format!("building endpoint url for {path}"))
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryApi {
    async fn interface_metrics(&self, interface: InterfaceId) -> Result<Vec<MetricRecord>> {
        let url = self.endpoint(&format!("api/interface/{}/metrics/", interface.0))?;
        let records = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding metric list for interface {}", interface.0))?;
        Ok(records)
    }

    async fn interface_last_used(&self, interface: InterfaceId) -> Result<LastUsedResponse> {
        let url = self.endpoint(&format!("api/interface/{}/last_used/", interface.0))?;
        let response = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding last_used for interface {}", interface.0))?;
        Ok(response)
    }

    async fn fetch_series(&self, url: &Url) -> Result<Vec<MetricSeries>> {
        let series = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding series response from {url}"))?;
        Ok(series)
    }

    async fn search_netboxes(&self, term: &str) -> Result<Vec<NetboxSuggestion>> {
        let url = self.endpoint("api/netbox/")?;
        let response: NetboxSearchResponse = self
            .http
            .get(url)
            .query(&[("search", term)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding netbox search results for {term:?}"))?;
        Ok(response.results)
    }

    async fn fetch_interfaces(&self, url: &Url) -> Result<InterfacePage> {
        let page = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding interface page from {url}"))?;
        Ok(page)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
