//! Mock Consul catalog for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use consul_registryd::CatalogRecord;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Contents served by [`MockConsul`]. Mutable while the server runs.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pub services: HashMap<String, Vec<String>>,
    pub instances: HashMap<String, Vec<CatalogRecord>>,
    /// Served verbatim from `/v1/catalog/services` when set
    pub raw_services: Option<String>,
    /// Served verbatim from `/v1/catalog/service/{name}`, ahead of `instances`
    pub raw_instances: HashMap<String, String>,
    /// Delay before every response
    pub delay: Option<Duration>,
    /// Status for every response instead of 200
    pub status: Option<StatusCode>,
    /// `dc` parameter of the most recent request
    pub last_dc: Option<String>,
}

type SharedCatalog = Arc<RwLock<Catalog>>;

pub struct MockConsul {
    pub addr: SocketAddr,
    pub catalog: SharedCatalog,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl MockConsul {
    pub async fn start(catalog: Catalog) -> Self {
        let catalog = Arc::new(RwLock::new(catalog));
        let app = Router::new()
            .route("/v1/catalog/services", get(services))
            .route("/v1/catalog/service/:name", get(service))
            .with_state(catalog.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let cancel = CancellationToken::new();
        let server_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_cancel.cancelled().await })
                .await
                .unwrap();
        });

        Self {
            addr,
            catalog,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn update(&self, f: impl FnOnce(&mut Catalog)) {
        f(&mut self.catalog.write().unwrap());
    }

    pub fn last_dc(&self) -> Option<String> {
        self.catalog.read().unwrap().last_dc.clone()
    }

    /// Stop accepting connections and wait for the server to exit.
    pub async fn close(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap();
        }
    }
}

impl Drop for MockConsul {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Record the request and return the configured delay and status.
fn observe(catalog: &SharedCatalog, params: &HashMap<String, String>) -> (Option<Duration>, Option<StatusCode>) {
    let mut catalog = catalog.write().unwrap();
    catalog.last_dc = params.get("dc").cloned();
    (catalog.delay, catalog.status)
}

async fn services(
    State(catalog): State<SharedCatalog>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (delay, status) = observe(&catalog, &params);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(status) = status {
        return status.into_response();
    }

    let (raw, services) = {
        let catalog = catalog.read().unwrap();
        (catalog.raw_services.clone(), catalog.services.clone())
    };
    match raw {
        Some(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => Json(services).into_response(),
    }
}

async fn service(
    State(catalog): State<SharedCatalog>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (delay, status) = observe(&catalog, &params);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(status) = status {
        return status.into_response();
    }

    let (raw, records) = {
        let catalog = catalog.read().unwrap();
        (
            catalog.raw_instances.get(&name).cloned(),
            catalog.instances.get(&name).cloned().unwrap_or_default(),
        )
    };
    match raw {
        Some(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => Json(records).into_response(),
    }
}

fn record(name: &str, id: &str, address: &str, version: &str) -> CatalogRecord {
    CatalogRecord {
        id: id.to_string(),
        node: "istio".to_string(),
        address: "172.19.0.5".to_string(),
        datacenter: "datacenter".to_string(),
        service_name: name.to_string(),
        service_address: address.to_string(),
        service_tags: vec![format!("version|{version}")],
        service_port: 9080,
        ..Default::default()
    }
}

/// Two services, four instances. The `reviews` v3 node advertises TCP.
pub fn bookinfo() -> Catalog {
    let productpage = vec![record("productpage", "111-111-111", "172.19.0.11", "v1")];

    let mut v3 = record("reviews", "444-444-444", "172.19.0.8", "v3");
    v3.node_meta.insert("protocol".to_string(), "tcp".to_string());
    let reviews = vec![
        record("reviews", "222-222-222", "172.19.0.6", "v1"),
        record("reviews", "333-333-333", "172.19.0.7", "v2"),
        v3,
    ];

    Catalog {
        services: HashMap::from([
            ("productpage".to_string(), vec!["version|v1".to_string()]),
            (
                "reviews".to_string(),
                vec!["version|v1".to_string(), "version|v2".to_string(), "version|v3".to_string()],
            ),
        ]),
        instances: HashMap::from([
            ("productpage".to_string(), productpage),
            ("reviews".to_string(), reviews),
        ]),
        ..Default::default()
    }
}
