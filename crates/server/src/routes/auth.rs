use std::{sync::Arc, time::Duration};

use axum::{Json, extract::{Query, State}, http::{HeaderMap, StatusCode}};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::auth::{
    domain::{AuthToken, LoginInput, RegisterInput, Role},
    repository::AccountRepository,
    verify_or_absent, AuthService, SessionVerifier,
};
use service::catalog::CatalogService;
use service::guard::RouteGuard;
use service::storage::BlobStore;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<dyn AccountRepository>>,
    pub verifier: Arc<dyn SessionVerifier>,
    pub verify_timeout: Duration,
    pub guard: Arc<RouteGuard>,
    pub catalog: Arc<CatalogService>,
    pub blobs: Arc<dyn BlobStore>,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid, pub role: Role }

#[derive(Serialize)]
pub struct MeOutput { pub user_id: Uuid, pub email: String, pub role: Role }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub name: String, pub role: Role, pub token: String }

#[derive(Deserialize)]
pub struct LoginPageQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Session for the current request, if any. Verification failures count as none.
pub async fn current_session(state: &ServerState, headers: &HeaderMap) -> Option<AuthToken> {
    verify_or_absent(state.verifier.as_ref(), headers, state.verify_timeout).await
}

/// 401 without a session, 403 for a non-admin session.
pub async fn require_admin(state: &ServerState, headers: &HeaderMap) -> Result<AuthToken, JsonApiError> {
    let session = current_session(state, headers).await.ok_or_else(JsonApiError::unauthorized)?;
    if session.role() != Role::Admin {
        return Err(JsonApiError::forbidden());
    }
    Ok(session)
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok(Json(RegisterOutput { user_id: user.id, role: user.role }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let user = session.user;
    let mut cookie = Cookie::new(state.cookie_name.clone(), session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(state.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token: session.token };
    Ok((jar, Json(out)))
}

pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::new(state.cookie_name.clone(), "");
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<ServerState>, headers: HeaderMap) -> Result<Json<MeOutput>, JsonApiError> {
    let session = current_session(&state, &headers).await.ok_or_else(JsonApiError::unauthorized)?;
    Ok(Json(MeOutput { user_id: session.user_id(), email: session.email().to_string(), role: session.role() }))
}

/// Login page stub; the view layer renders the form and posts to `/auth/login`.
pub async fn login_page(Query(q): Query<LoginPageQuery>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "login", "callbackUrl": q.callback_url }))
}
