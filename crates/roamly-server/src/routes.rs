//! HTTP routes for the package search API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use roamly_core::{Catalog, Indexer, NewPackage, Package, RoamlyError, SuggestEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
///
/// `Catalog` synchronizes its own connection, so handlers borrow it directly
/// and never hold a lock across an external model call. Concurrent requests
/// only contend for the brief duration of individual SQL statements.
pub struct AppState {
    pub catalog: Catalog,
    pub engine: SuggestEngine,
    pub indexer: Indexer,
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/packages/suggestPackages", post(suggest_packages))
        .route("/packages", post(create_package).get(list_packages))
        .route("/packages/{id}", get(get_package))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub status: &'static str,
    pub message: String,
    pub query: String,
    pub results_count: usize,
    pub data: Vec<Package>,
    pub suggestion: String,
}

async fn suggest_packages(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ApiError> {
    let suggestion = state.engine.suggest(&state.catalog, &request.query).await?;

    Ok(Json(SuggestResponse {
        status: "success",
        message: "Packages suggested successfully".to_string(),
        query: suggestion.query,
        results_count: suggestion.results_count,
        data: suggestion.results.into_iter().map(|r| r.package).collect(),
        suggestion: suggestion.suggestion,
    }))
}

#[derive(Debug, Serialize)]
pub struct PackageResponse {
    pub status: &'static str,
    pub message: String,
    pub data: Package,
}

async fn create_package(
    State(state): State<Arc<AppState>>,
    Json(new_package): Json<NewPackage>,
) -> Result<(StatusCode, Json<PackageResponse>), ApiError> {
    let package = state.indexer.ingest(&state.catalog, new_package).await?;

    Ok((
        StatusCode::CREATED,
        Json(PackageResponse {
            status: "success",
            message: "Tour package created successfully".to_string(),
            data: package,
        }),
    ))
}

async fn list_packages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Package>>, ApiError> {
    Ok(Json(state.catalog.list()?))
}

async fn get_package(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Package>, ApiError> {
    Ok(Json(state.catalog.get(id)?))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Maps the core error taxonomy onto HTTP responses
pub struct ApiError(RoamlyError);

impl From<RoamlyError> for ApiError {
    fn from(e: RoamlyError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RoamlyError::InvalidQuery(_) | RoamlyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RoamlyError::PackageNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, category = self.0.category(), "Request failed");
        }

        let body = serde_json::json!({
            "status": "error",
            "error": self.0.category(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
