//! QR code handlers
//!
//! `GET` accepts either a scoped QR token or the owner's session, so the
//! image can be embedded with a short-lived bearer token. Regeneration and
//! token issuance require the identity gateway.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use link_core::{QrImage, QrSize, ShortCode};
use link_service::dto::{qr_code_path, GenerateQrRequest, QrGeneratedResponse, QrTokenResponse};
use link_service::LinkService;
use serde::Deserialize;

use crate::extractors::{AuthUser, CodePath, LinkAccess, OptionalValidatedJson};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

const QR_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Debug, Default, Deserialize)]
pub struct QrImageParams {
    #[serde(default)]
    pub download: bool,
}

fn image_response(code: &ShortCode, image: QrImage, download: bool) -> ApiResult<Response> {
    let disposition = if download {
        format!("attachment; filename=\"qr-{code}.{}\"", image.metadata.format)
    } else {
        "inline".to_string()
    };
    let disposition = HeaderValue::from_str(&disposition).map_err(ApiError::internal)?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(image.content_type()),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static(QR_CACHE_CONTROL)),
        ],
        image.bytes,
    )
        .into_response())
}

/// Fetch the QR image, rendering it on first use
///
/// GET /api/urls/{code}/qr
pub async fn get_qr(
    State(state): State<AppState>,
    link: LinkAccess,
    Query(params): Query<QrImageParams>,
) -> ApiResult<Response> {
    let user_id = link.require_user()?;

    let image = LinkService::new(state.service_context())
        .get_or_generate_qr(&link.code, user_id)
        .await?;

    image_response(&link.code, image, params.download)
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateParams {
    pub size: Option<u32>,
}

/// Re-render the QR image at the requested size
///
/// POST /api/urls/{code}/qr
pub async fn regenerate_qr(
    State(state): State<AppState>,
    auth: AuthUser,
    CodePath(code): CodePath,
    Query(params): Query<RegenerateParams>,
    OptionalValidatedJson(body): OptionalValidatedJson<GenerateQrRequest>,
) -> ApiResult<Json<QrGeneratedResponse>> {
    // The query parameter wins over the body
    let size = params
        .size
        .or_else(|| body.and_then(|b| b.size))
        .unwrap_or_else(|| QrSize::default().pixels());

    let (link, image) = LinkService::new(state.service_context())
        .regenerate_qr(&code, auth.user_id, size)
        .await?;

    Ok(Json(QrGeneratedResponse::new(&link, &image)))
}

/// Issue a scoped token for fetching this link's QR image
///
/// POST /api/urls/{code}/qr-token
pub async fn issue_qr_token(
    State(state): State<AppState>,
    auth: AuthUser,
    CodePath(code): CodePath,
) -> ApiResult<Json<QrTokenResponse>> {
    let token = LinkService::new(state.service_context())
        .issue_qr_token(&code, auth.user_id, &auth.email)
        .await?;

    Ok(Json(QrTokenResponse {
        token: token.token,
        token_type: "Bearer".to_string(),
        expires_in: token.expires_in,
        qr_code_url: qr_code_path(&code),
    }))
}
