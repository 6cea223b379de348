//! Public redirect endpoint
//!
//! `GET /{code}` records a visit and answers 302; `HEAD /{code}` only
//! reports where the link points and never counts as a visit.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use link_core::{DomainError, ShortCode, ShortLink};
use link_service::LinkService;
use tracing::{info, warn};

use crate::extractors::ClientInfo;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

async fn resolve(state: &AppState, segment: &str) -> ApiResult<ShortLink> {
    if ShortCode::is_reserved(segment) {
        return Err(DomainError::LinkNotFound(segment.to_string()).into());
    }

    Ok(LinkService::new(state.service_context())
        .resolve_for_redirect(segment)
        .await?)
}

fn location_response(status: StatusCode, link: &ShortLink) -> ApiResult<Response> {
    let location = HeaderValue::from_str(&link.destination).map_err(ApiError::internal)?;
    Ok((status, [(header::LOCATION, location)]).into_response())
}

/// Follow a short link
///
/// GET /{code}
pub async fn follow(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    client: ClientInfo,
) -> ApiResult<Response> {
    let link = resolve(&state, &segment).await?;

    // Analytics never block the redirect
    if let Err(e) = LinkService::new(state.service_context())
        .record_visit(link.id, &client.ip, &client.user_agent)
        .await
    {
        warn!(code = %link.code, error = %e, "Failed to record visit");
    }

    info!(code = %link.code, client_ip = %client.ip, "Redirecting");
    location_response(StatusCode::FOUND, &link)
}

/// Probe a short link without recording a visit
///
/// HEAD /{code}
pub async fn probe(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> ApiResult<Response> {
    let link = resolve(&state, &segment).await?;
    location_response(StatusCode::OK, &link)
}
