//! Link handlers
//!
//! Endpoints for creating, listing, updating and deleting short links.
//! Every route here sits behind the identity gateway.

use axum::{extract::State, Json};
use link_service::dto::{
    ApiResponse, LinkResponse, LinkSummaryResponse, MessageResponse, ShortenRequest,
    ShortenResponse, UpdateLinkRequest, UpdateStatusRequest,
};
use link_service::LinkService;

use crate::extractors::{AuthUser, CodePath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Shorten a URL
///
/// POST /api/shorten
pub async fn shorten(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ShortenRequest>,
) -> ApiResult<Created<Json<ShortenResponse>>> {
    let expiration = request.expiration()?;
    let ctx = state.service_context();

    let link = LinkService::new(ctx)
        .create_link(&request.url, auth.user_id, &expiration)
        .await?;

    Ok(Created(Json(ShortenResponse::new(&link, ctx.short_url_base()))))
}

/// List the caller's links with statistics
///
/// GET /api/urls
pub async fn list_links(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<LinkSummaryResponse>>>> {
    let links = LinkService::new(state.service_context())
        .list_links(auth.user_id)
        .await?;

    Ok(Json(ApiResponse::new(
        links.into_iter().map(LinkSummaryResponse::from).collect(),
    )))
}

/// Get one of the caller's links
///
/// GET /api/urls/{code}
pub async fn get_link(
    State(state): State<AppState>,
    auth: AuthUser,
    CodePath(code): CodePath,
) -> ApiResult<Json<LinkResponse>> {
    let link = LinkService::new(state.service_context())
        .get_owned_link(&code, auth.user_id)
        .await?;

    Ok(Json(link.into()))
}

/// Visit statistics for one of the caller's links
///
/// GET /api/urls/{code}/stats
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    CodePath(code): CodePath,
) -> ApiResult<Json<LinkSummaryResponse>> {
    let summary = LinkService::new(state.service_context())
        .get_stats(&code, auth.user_id)
        .await?;

    Ok(Json(LinkSummaryResponse::from(summary)))
}

/// Change destination and/or expiration
///
/// PUT /api/urls/{code}
pub async fn update_link(
    State(state): State<AppState>,
    auth: AuthUser,
    CodePath(code): CodePath,
    ValidatedJson(request): ValidatedJson<UpdateLinkRequest>,
) -> ApiResult<Json<LinkResponse>> {
    let expiration = request.expiration_change()?;

    let link = LinkService::new(state.service_context())
        .update_link(
            &code,
            auth.user_id,
            request.destination(),
            expiration.as_ref(),
        )
        .await?;

    Ok(Json(link.into()))
}

/// Pause or resume a link
///
/// PATCH /api/urls/{code}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    CodePath(code): CodePath,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<Json<LinkResponse>> {
    let link = LinkService::new(state.service_context())
        .update_status(&code, auth.user_id, &request.status)
        .await?;

    Ok(Json(link.into()))
}

/// Delete a link and its visits
///
/// DELETE /api/urls/{code}
pub async fn delete_link(
    State(state): State<AppState>,
    auth: AuthUser,
    CodePath(code): CodePath,
) -> ApiResult<Json<MessageResponse>> {
    LinkService::new(state.service_context())
        .delete_link(&code, auth.user_id)
        .await?;

    Ok(Json(MessageResponse::new(format!("Link {code} deleted"))))
}
