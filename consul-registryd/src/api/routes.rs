use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mesh_model::api::{ConfigResponse, HostInstancesRequest, InstancesRequest};
use mesh_model::{Service, ServiceInstance};
use crate::controller::Controller;
use crate::hash;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/config", get(get_config))
        .route("/v1/services", get(get_services))
        .route("/v1/services/hash", get(get_hash))
        .route("/v1/services/:hostname", get(get_service))
        .route("/v1/instances", post(post_instances))
        .route("/v1/host-instances", post(post_host_instances))
        .with_state(state)
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        domain: state.controller.codec().domain().to_string(),
        datacenter: state.controller.datacenter().to_string(),
    })
}

async fn get_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    Json(state.controller.services().await)
}

/// Digest of every instance in the registry; a full scan on each call.
async fn get_hash(State(state): State<AppState>) -> String {
    let instances = state.controller.all_instances().await;
    hash::compute_hash(&instances)
}

async fn get_service(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> Result<Json<Service>, StatusCode> {
    state
        .controller
        .get_service(&hostname)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn post_instances(
    State(state): State<AppState>,
    Json(req): Json<InstancesRequest>,
) -> Json<Vec<ServiceInstance>> {
    Json(
        state
            .controller
            .instances(&req.hostname, &req.ports, &req.labels)
            .await,
    )
}

async fn post_host_instances(
    State(state): State<AppState>,
    Json(req): Json<HostInstancesRequest>,
) -> Json<Vec<ServiceInstance>> {
    Json(state.controller.host_instances(&req.address_set()).await)
}
