pub mod auth;
pub mod guard;
pub mod pages;
pub mod services;
pub mod uploads;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use self::auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router. The route guard wraps every route and
/// decides for itself which paths it applies to; uploaded blobs under
/// `blob_root` are served at `/blobs`.
pub fn build_router(state: ServerState, cors: CorsLayer, blob_root: &str) -> Router {
    // Public routes (health, docs, uploaded images)
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest_service("/blobs", ServeDir::new(blob_root));

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    // Guarded pages
    let pages = Router::new()
        .route("/admin", get(pages::admin_dashboard))
        .route("/admin/*rest", get(pages::admin_dashboard))
        .route("/profile", get(pages::profile_page))
        .route("/profile/*rest", get(pages::profile_page));

    let api = Router::new()
        .route("/api/services", get(services::list_services).post(services::create_service))
        .route("/api/services/:id", get(services::get_service).delete(services::delete_service))
        .route("/api/uploads/:name", post(uploads::upload));

    public
        .merge(auth_routes)
        .merge(pages)
        .merge(api)
        .layer(middleware::from_fn_with_state(state.clone(), guard::route_guard))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
