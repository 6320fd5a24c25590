//! Gateway route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ListingError;
use crate::service::ResourceService;
use crate::storage::Resource;
use crate::types::{
    ErrorResponse, FetchRequest, FetchResponse, HealthResponse, ListRequest, ListResponse,
};

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: msg.into(),
        }
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        let status = match &err {
            ListingError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ListingError::Store { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ListingError::Mapping(_) | ListingError::Seed(_) | ListingError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            code: self.code.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List endpoint: `POST /v1/list-<resources>`.
pub async fn list<R: Resource + Serialize>(
    State(service): State<Arc<ResourceService<R>>>,
    Json(req): Json<ListRequest>,
) -> Result<Json<ListResponse<R>>, ApiError> {
    Ok(Json(service.list(req)?))
}

/// Fetch endpoint: `GET /v1/<resources>/:id`.
pub async fn fetch<R: Resource + Serialize>(
    State(service): State<Arc<ResourceService<R>>>,
    Path(id): Path<String>,
) -> Result<Json<FetchResponse<R>>, ApiError> {
    let response = service.fetch(FetchRequest { id: id.clone() })?;
    if response.record.is_none() {
        return Err(ApiError::not_found(format!("{} {} not found", R::SINGULAR, id)));
    }
    Ok(Json(response))
}

/// Routes for one resource, under its own prefix.
pub fn resource_routes<R: Resource + Serialize>(service: Arc<ResourceService<R>>) -> Router {
    Router::new()
        .route(&format!("/v1/list-{}", R::PLURAL), post(list::<R>))
        .route(&format!("/v1/{}/:id", R::PLURAL), get(fetch::<R>))
        .with_state(service)
}
