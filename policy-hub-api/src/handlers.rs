//! API request handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use policy_hub_core::{ApiResult, Bundle, InstallRequest};
use policy_hub_installer::DEFAULT_CONCURRENCY;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Reply with the envelope as body and its httpcode as status
fn envelope(result: ApiResult) -> Response {
    let status =
        StatusCode::from_u16(result.httpcode).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(result)).into_response()
}

// ==================== Hub Handlers ====================

/// Fetch the configured hub's index
pub async fn hub_index(State(state): State<Arc<AppState>>) -> Response {
    let result = state
        .installer
        .catalog()
        .get_policies(state.config())
        .await;
    envelope(result)
}

/// Install a single bundle from the hub
///
/// An optional `credentials` object (`username`/`password`) is sent as basic
/// auth on the bundle download.
pub async fn install_bundle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InstallRequest>,
) -> Result<Response, ApiError> {
    if req.bundle_name.trim().is_empty() {
        return Err(ApiError::BadRequest("bundle_name must not be empty".into()));
    }

    let result = state.installer.install(&req).await;
    Ok(envelope(result))
}

#[derive(Debug, Deserialize)]
pub struct BatchInstallRequest {
    pub bundles: Vec<InstallRequest>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

/// Install several bundles; one envelope per bundle, in request order
pub async fn install_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchInstallRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.bundles.is_empty() {
        return Err(ApiError::BadRequest("bundles must not be empty".into()));
    }

    let concurrency = req.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
    let results = state.installer.install_many(&req.bundles, concurrency).await;

    tracing::info!(
        "Batch install finished: {}/{} succeeded",
        results.iter().filter(|r| r.success).count(),
        results.len()
    );

    Ok(Json(results))
}

// ==================== Policy Store Handlers ====================

#[derive(Debug, Default, Deserialize)]
pub struct AddPolicyQuery {
    #[serde(default)]
    pub detail: bool,
}

/// Add a policy bundle to the local store
pub async fn add_policy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddPolicyQuery>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let bundle = Bundle::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let result = state.policy_store.add_policy(bundle, query.detail).await;
    Ok(envelope(result))
}

/// Get a policy by ID
pub async fn get_policy(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    envelope(state.policy_store.get_policy(&id).await)
}

/// List all policies
pub async fn list_policies(State(state): State<Arc<AppState>>) -> Response {
    envelope(state.policy_store.get_policies().await)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "policy-hub"
    }))
}
