use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use crate::error::RegistryError;
use crate::registry::{CatalogRecord, Registry};

/// Catalog client for one Consul agent and datacenter.
#[derive(Debug, Clone)]
pub struct ConsulClient {
    client: Client,
    base_url: Url,
    datacenter: String,
}

impl ConsulClient {
    /// Create a client. Every request is bounded by `timeout`.
    pub fn new(
        endpoint: &str,
        datacenter: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        if timeout.is_zero() {
            return Err(RegistryError::config("timeout must be positive"));
        }

        let base_url = Url::parse(endpoint)
            .map_err(|e| RegistryError::config(format!("invalid endpoint {endpoint:?}: {e}")))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(RegistryError::config(format!(
                "unsupported endpoint scheme {:?}",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(RegistryError::config(format!("endpoint {endpoint:?} has no host")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            datacenter: datacenter.into(),
        })
    }

    /// Build `{endpoint}/v1/catalog/{segments..}?dc={datacenter}`.
    fn catalog_url(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::config("endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend(["v1", "catalog"])
            .extend(segments);

        if !self.datacenter.is_empty() {
            url.query_pairs_mut().append_pair("dc", &self.datacenter);
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RegistryError> {
        let path = url.path().to_string();
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status { path, status });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RegistryError::Decode {
            path,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Registry for ConsulClient {
    async fn list_service_names(&self) -> Result<HashMap<String, Vec<String>>, RegistryError> {
        let url = self.catalog_url(&["services"])?;
        let services: HashMap<String, Option<Vec<String>>> = self.get_json(url).await?;

        Ok(services
            .into_iter()
            .map(|(name, tags)| (name, tags.unwrap_or_default()))
            .collect())
    }

    async fn list_instances(&self, service_name: &str) -> Result<Vec<CatalogRecord>, RegistryError> {
        let url = self.catalog_url(&["service", service_name])?;
        let records: Option<Vec<CatalogRecord>> = self.get_json(url).await?;
        Ok(records.unwrap_or_default())
    }

    fn datacenter(&self) -> &str {
        &self.datacenter
    }
}
