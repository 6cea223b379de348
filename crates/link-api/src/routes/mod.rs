//! Route definitions
//!
//! Route groups carry their own gateway: identity routes under `/api` and
//! `/auth/me`, the documentation surface under `/swagger`, and the rate
//! limiter on credential endpoints. The catch-all `/:code` redirect is
//! registered last.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{auth, docs, health, links, qr, redirect};
use crate::middleware::{rate_limit, require_docs_session, require_identity};
use crate::state::AppState;

/// Create the application router with every route group
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(auth_routes(state))
        .merge(api_routes(state))
        .merge(qr_image_routes())
        .merge(docs_routes(state))
        .merge(redirect_routes())
}

/// Health check routes (no gateway, no rate limit)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Authentication routes
fn auth_routes(state: &AppState) -> Router<AppState> {
    let credentials = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route_layer(from_fn_with_state(state.clone(), rate_limit));

    let session = Router::new()
        .route("/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(state.clone(), require_identity));

    Router::new()
        .merge(credentials)
        .merge(session)
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/docs/logout", post(auth::docs_logout))
        .route("/auth/login-page", get(auth::login_page))
}

/// Link management routes behind the identity gateway
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/shorten", post(links::shorten))
        .route("/api/urls", get(links::list_links))
        .route(
            "/api/urls/:code",
            get(links::get_link)
                .put(links::update_link)
                .delete(links::delete_link),
        )
        .route("/api/urls/:code/status", patch(links::update_status))
        .route("/api/urls/:code/stats", get(links::get_stats))
        .route("/api/urls/:code/qr", post(qr::regenerate_qr))
        .route("/api/urls/:code/qr-token", post(qr::issue_qr_token))
        .route_layer(from_fn_with_state(state.clone(), require_identity))
}

/// QR image fetch, authenticated by the handler itself so a scoped QR
/// token works without a session
fn qr_image_routes() -> Router<AppState> {
    Router::new().route("/api/urls/:code/qr", get(qr::get_qr))
}

/// Documentation surface behind its own cookie
fn docs_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/swagger", get(docs::index))
        .route("/swagger/routes.json", get(docs::routes_json))
        .route_layer(from_fn_with_state(state.clone(), require_docs_session))
}

/// Public redirect
fn redirect_routes() -> Router<AppState> {
    Router::new().route("/:code", get(redirect::follow).head(redirect::probe))
}
