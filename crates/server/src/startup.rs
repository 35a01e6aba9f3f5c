use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::{
    auth::{
        repo::json::JsonAccountRepository,
        repository::AccountRepository,
        service::AuthConfig,
        AuthService, JwtSessionVerifier, SessionVerifier,
    },
    catalog::{CatalogService, JsonServiceRepository},
    guard::RouteGuard,
    runtime,
    storage::init_blob_store,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire stores, verifier and guard from configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let accounts: Arc<dyn AccountRepository> = Arc::new(JsonAccountRepository::open(&cfg.data.dir).await?);
    let auth = Arc::new(AuthService::new(accounts, AuthConfig::from_settings(&cfg.auth)));

    let verifier: Arc<dyn SessionVerifier> =
        Arc::new(JwtSessionVerifier::new(cfg.auth.jwt_secret.clone(), cfg.auth.cookie_name.clone()));
    let verify_timeout = Duration::from_millis(cfg.auth.verify_timeout_ms);
    let guard = Arc::new(RouteGuard::new(&cfg.guard, Arc::clone(&verifier), verify_timeout));

    let services = JsonServiceRepository::open(&cfg.data.dir).await?;
    let catalog = Arc::new(CatalogService::new(Arc::new(services)));
    let blobs = init_blob_store(&cfg.storage).await?;

    Ok(ServerState {
        auth,
        verifier,
        verify_timeout,
        guard,
        catalog,
        blobs,
        cookie_name: cfg.auth.cookie_name.clone(),
        cookie_secure: cfg.auth.cookie_secure,
    })
}

pub fn build_app(state: ServerState, cfg: &AppConfig) -> Router {
    routes::build_router(state, build_cors(), &cfg.storage.root)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    runtime::ensure_env(&cfg.data.dir, &cfg.storage.root)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let state = build_state(&cfg).await?;
    let app = build_app(state, &cfg);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, matchers = ?cfg.guard.matchers, "starting booking portal server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
