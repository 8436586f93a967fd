use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use futures::stream::{self, StreamExt};
use mesh_model::{HostnameCodec, LabelsCollection, Service, ServiceInstance};
use crate::consul::{ConsulClient, TagTranslator};
use crate::error::RegistryError;
use crate::registry::{CatalogRecord, Registry};

/// Upper bound on concurrent per-service fetches during a full scan.
const MAX_CONCURRENT_FETCHES: usize = 16;

/// Translates registry records into canonical services and instances.
///
/// Holds no cache: every query goes back to the registry, and a registry
/// failure is logged and turned into an empty result.
#[derive(Debug, Clone)]
pub struct Controller {
    registry: Arc<dyn Registry>,
    codec: HostnameCodec,
    translator: TagTranslator,
}

impl Controller {
    /// Controller over a Consul agent with the default domain and protocol
    /// settings. Fails only on invalid configuration; the agent is not
    /// contacted.
    pub fn new(endpoint: &str, datacenter: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let client = ConsulClient::new(endpoint, datacenter, timeout)?;
        Ok(Self::with_registry(
            Arc::new(client),
            HostnameCodec::default(),
            TagTranslator::default(),
        ))
    }

    pub fn with_registry(
        registry: Arc<dyn Registry>,
        codec: HostnameCodec,
        translator: TagTranslator,
    ) -> Self {
        Self {
            registry,
            codec,
            translator,
        }
    }

    pub fn codec(&self) -> &HostnameCodec {
        &self.codec
    }

    pub fn datacenter(&self) -> &str {
        self.registry.datacenter()
    }

    /// One service per distinct registry name, sorted by hostname.
    pub async fn services(&self) -> Vec<Service> {
        let names = match self.registry.list_service_names().await {
            Ok(names) => names,
            Err(e) => {
                log_unavailable("list services", &e);
                return Vec::new();
            }
        };

        let mut services = BTreeMap::new();
        for name in names.keys() {
            if !self.codec.is_valid_name(name) {
                tracing::warn!("Skipping registry service {:?}, not a valid mesh name", name);
                continue;
            }
            let hostname = self.codec.to_hostname(name);
            services
                .entry(hostname.clone())
                .or_insert_with(|| Service::new(hostname));
        }

        services.into_values().collect()
    }

    /// Resolve a hostname. A service exists only while the registry reports
    /// at least one instance of it.
    pub async fn get_service(&self, hostname: &str) -> Option<Service> {
        let name = self.resolve(hostname)?;
        let records = self.fetch_instances(&name).await?;
        self.translator.convert_service(&name, &records, &self.codec)
    }

    /// Instances of a service, filtered by port name and labels.
    ///
    /// An instance is kept when `ports` is empty or contains its port name,
    /// and `labels` is empty or one of its selectors matches in full.
    pub async fn instances(
        &self,
        hostname: &str,
        ports: &[String],
        labels: &LabelsCollection,
    ) -> Vec<ServiceInstance> {
        let Some(name) = self.resolve(hostname) else {
            return Vec::new();
        };
        let Some(records) = self.fetch_instances(&name).await else {
            return Vec::new();
        };

        records
            .iter()
            .map(|record| self.translator.convert_instance(&name, record, &self.codec))
            .filter(|inst| ports.is_empty() || ports.contains(&inst.endpoint.service_port.name))
            .filter(|inst| labels.has_subset_of(&inst.labels))
            .collect()
    }

    /// Instances whose address maps to `true` in `addresses`.
    ///
    /// Scans the whole registry (one round-trip per service), so callers
    /// should batch addresses into a single call.
    pub async fn host_instances(&self, addresses: &HashMap<String, bool>) -> Vec<ServiceInstance> {
        self.all_instances()
            .await
            .into_iter()
            .filter(|inst| addresses.get(&inst.endpoint.address).copied().unwrap_or(false))
            .collect()
    }

    /// Every instance of every valid service name, ordered by service name.
    ///
    /// If any service cannot be fetched the result is empty rather than
    /// partial.
    pub async fn all_instances(&self) -> Vec<ServiceInstance> {
        let names = match self.registry.list_service_names().await {
            Ok(names) => names,
            Err(e) => {
                log_unavailable("list services", &e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = names
            .into_keys()
            .filter(|name| {
                let valid = self.codec.is_valid_name(name);
                if !valid {
                    tracing::warn!("Skipping registry service {:?}, not a valid mesh name", name);
                }
                valid
            })
            .collect();
        names.sort();

        // buffered() yields in input order
        let fetches: Vec<_> = names.iter().map(|name| self.registry.list_instances(name)).collect();
        let results: Vec<_> = stream::iter(fetches)
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;

        let mut instances = Vec::new();
        for (name, result) in names.iter().zip(results) {
            match result {
                Ok(records) => instances.extend(
                    records
                        .iter()
                        .map(|record| self.translator.convert_instance(name, record, &self.codec)),
                ),
                Err(e) => {
                    log_unavailable(&format!("list instances of {name}"), &e);
                    return Vec::new();
                }
            }
        }

        instances
    }

    fn resolve(&self, hostname: &str) -> Option<String> {
        match self.codec.parse_hostname(hostname) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        }
    }

    /// Records for one service; `None` when the registry is unavailable or
    /// reports no instances.
    async fn fetch_instances(&self, name: &str) -> Option<Vec<CatalogRecord>> {
        match self.registry.list_instances(name).await {
            Ok(records) if records.is_empty() => None,
            Ok(records) => Some(records),
            Err(e) => {
                log_unavailable(&format!("list instances of {name}"), &e);
                None
            }
        }
    }
}

fn log_unavailable(operation: &str, error: &RegistryError) {
    tracing::warn!("Registry unavailable ({}) during {}: {}", error.kind(), operation, error);
}
