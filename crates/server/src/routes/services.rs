use axum::{extract::{Path, State}, http::{HeaderMap, StatusCode}, Json};
use uuid::Uuid;

use service::catalog::ServiceRecord;

use crate::errors::JsonApiError;
use crate::routes::auth::{require_admin, ServerState};

#[utoipa::path(get, path = "/api/services", tag = "services", responses((status = 200, description = "Services, newest first")))]
pub async fn list_services(State(state): State<ServerState>) -> Result<Json<Vec<ServiceRecord>>, JsonApiError> {
    Ok(Json(state.catalog.list().await?))
}

/// Body is taken as raw JSON so that wrong-typed fields come back as field errors.
#[utoipa::path(post, path = "/api/services", tag = "services", request_body = crate::openapi::ServiceFormDoc, responses((status = 201, description = "Created"), (status = 401, description = "Unauthorized"), (status = 403, description = "Forbidden"), (status = 422, description = "Validation Error")))]
pub async fn create_service(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(raw): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ServiceRecord>), JsonApiError> {
    require_admin(&state, &headers).await?;
    let record = state.catalog.create(&raw).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_service(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<ServiceRecord>, JsonApiError> {
    Ok(Json(state.catalog.get(id).await?))
}

pub async fn delete_service(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    require_admin(&state, &headers).await?;
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
