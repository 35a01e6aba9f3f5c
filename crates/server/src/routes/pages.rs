use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use service::auth::domain::Role;

use crate::errors::JsonApiError;
use crate::routes::auth::{current_session, require_admin, ServerState};

#[derive(Serialize)]
pub struct AdminDashboard {
    pub page: &'static str,
    pub email: String,
    pub services: usize,
}

#[derive(Serialize)]
pub struct ProfilePage {
    pub page: &'static str,
    pub email: String,
    pub role: Role,
}

/// Admin dashboard. The guard only checks that a session exists; the role is checked here.
pub async fn admin_dashboard(State(state): State<ServerState>, headers: HeaderMap) -> Result<Json<AdminDashboard>, JsonApiError> {
    let session = require_admin(&state, &headers).await?;
    let services = state.catalog.count().await?;
    Ok(Json(AdminDashboard { page: "admin", email: session.email().to_string(), services }))
}

pub async fn profile_page(State(state): State<ServerState>, headers: HeaderMap) -> Result<Json<ProfilePage>, JsonApiError> {
    let session = current_session(&state, &headers).await.ok_or_else(JsonApiError::unauthorized)?;
    Ok(Json(ProfilePage { page: "profile", email: session.email().to_string(), role: session.role() }))
}
