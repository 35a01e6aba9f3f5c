use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use service::guard::RedirectDecision;

use crate::routes::auth::ServerState;

/// Middleware wrapping every route. Paths outside the guard's matcher set pass
/// straight through without touching the verifier.
pub async fn route_guard(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    if !state.guard.applies_to(req.uri().path()) {
        return next.run(req).await;
    }
    let path = req.uri().path().to_owned();
    let headers = req.headers().clone();
    match state.guard.evaluate(&path, &headers).await {
        RedirectDecision::Continue => next.run(req).await,
        RedirectDecision::Redirect { location } => Redirect::temporary(&location).into_response(),
    }
}
