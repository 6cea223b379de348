//! Request authentication gateway
//!
//! A token is read from the policy's cookie, falling back to an
//! `Authorization: Bearer` header. Failures either redirect browsers to the
//! login page or answer API clients with a JSON 401, as decided by
//! [`failure_response`]. Successful requests carry an [`Identity`] in their
//! extensions.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use link_common::{AppError, Claims, TokenCodec, TokenError};
use link_core::{ShortCode, UserId};
use tracing::debug;

use crate::response::ApiError;
use crate::state::AppState;

/// Cookie holding the identity token
pub const AUTH_COOKIE: &str = "auth_token";

/// Cookie holding the documentation session token
pub const DOCS_COOKIE: &str = "swagger_auth_token";

/// Login form served to browsers that fail authentication
pub const LOGIN_PAGE_PATH: &str = "/auth/login-page";

const API_PREFIX: &str = "/api";

const WWW_AUTH_EXPIRED: &str = r#"Bearer error="invalid_token", error_description="token expired""#;
const WWW_AUTH_INVALID: &str = r#"Bearer error="invalid_token", error_description="invalid token""#;

/// Where a gate reads its token from and how it fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    pub cookie_name: &'static str,
    /// Browsers are redirected to `login_path` instead of receiving JSON
    pub allow_redirects: bool,
    pub login_path: &'static str,
    /// Insert the raw [`AuthToken`] into request extensions
    pub store_token: bool,
    /// Insert the full [`Claims`] into request extensions
    pub store_claims: bool,
}

impl AuthPolicy {
    /// The application surface
    pub const IDENTITY: Self = Self {
        cookie_name: AUTH_COOKIE,
        allow_redirects: true,
        login_path: LOGIN_PAGE_PATH,
        store_token: true,
        store_claims: true,
    };

    /// The documentation surface; its cookie never grants application access
    pub const DOCS: Self = Self {
        cookie_name: DOCS_COOKIE,
        allow_redirects: true,
        login_path: LOGIN_PAGE_PATH,
        store_token: false,
        store_claims: false,
    };
}

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub provider: String,
}

/// Raw token the caller authenticated with
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

/// Why a request could not be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    Expired,
    Invalid,
}

impl AuthFailure {
    fn www_authenticate(self) -> Option<&'static str> {
        match self {
            Self::MissingToken => None,
            Self::Expired => Some(WWW_AUTH_EXPIRED),
            Self::Invalid => Some(WWW_AUTH_INVALID),
        }
    }

    fn error(self) -> AppError {
        match self {
            Self::MissingToken => AppError::MissingAuth,
            Self::Expired => AppError::TokenExpired,
            Self::Invalid => AppError::InvalidToken,
        }
    }
}

impl From<TokenError> for AuthFailure {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// A verified token and the identity it asserts
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: Identity,
    pub token: String,
    pub claims: Claims,
}

/// Token from an `Authorization: Bearer` header (scheme matched case-insensitively)
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Token from the named cookie, else from the bearer header
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);

    jar.get(cookie_name)
        .map(|cookie| cookie.value().trim())
        .filter(|value| !value.is_empty())
        .or_else(|| bearer_token(headers))
        .map(String::from)
}

/// Requests that expect JSON rather than an HTML redirect
pub fn is_api_call(path: &str, headers: &HeaderMap) -> bool {
    let under_api = path == API_PREFIX || path.starts_with("/api/");

    let xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest");

    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    under_api || xhr || wants_json
}

/// Verify the request's token under `policy`
pub fn authenticate(
    headers: &HeaderMap,
    policy: &AuthPolicy,
    codec: &TokenCodec,
) -> Result<Authenticated, AuthFailure> {
    let token = extract_token(headers, policy.cookie_name).ok_or(AuthFailure::MissingToken)?;
    let claims = codec.verify(&token)?;

    // A valid signature over a corrupt subject is still rejected
    let user_id = claims.user_id().map_err(|_| AuthFailure::Invalid)?;

    Ok(Authenticated {
        identity: Identity {
            user_id,
            email: claims.email.clone(),
            provider: claims.provider.clone(),
        },
        token,
        claims,
    })
}

/// Terminating response for a failed authentication
pub fn failure_response(
    policy: &AuthPolicy,
    failure: AuthFailure,
    uri: &Uri,
    headers: &HeaderMap,
) -> Response {
    let mut response = if policy.allow_redirects && !is_api_call(uri.path(), headers) {
        let original = uri
            .path_and_query()
            .map_or_else(|| uri.path(), |pq| pq.as_str());
        let location = format!(
            "{}?redirect={}",
            policy.login_path,
            urlencoding::encode(original)
        );
        Redirect::temporary(&location).into_response()
    } else {
        ApiError::App(failure.error()).into_response()
    };

    let headers = response.headers_mut();
    if let Some(challenge) = failure.www_authenticate() {
        headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
    }
    set_no_cache(headers);

    response
}

fn set_no_cache(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

/// Gate for the application routes
pub async fn require_identity(State(state): State<AppState>, request: Request, next: Next) -> Response {
    gate(&state, &AuthPolicy::IDENTITY, request, next).await
}

/// Gate for the documentation routes
pub async fn require_docs_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, &AuthPolicy::DOCS, request, next).await
}

async fn gate(state: &AppState, policy: &AuthPolicy, mut request: Request, next: Next) -> Response {
    match authenticate(request.headers(), policy, state.token_codec()) {
        Ok(auth) => {
            let extensions = request.extensions_mut();
            if policy.store_token {
                extensions.insert(AuthToken(auth.token));
            }
            if policy.store_claims {
                extensions.insert(auth.claims);
            }
            extensions.insert(auth.identity);

            next.run(request).await
        }
        Err(failure) => {
            debug!(
                ?failure,
                cookie = policy.cookie_name,
                path = %request.uri().path(),
                "Authentication failed"
            );
            failure_response(policy, failure, request.uri(), request.headers())
        }
    }
}

/// Outcome of the non-aborting gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// A scoped token issued for the requested link
    Scoped { user_id: UserId },
    /// A regular identity session
    Session(Identity),
    Anonymous,
}

impl Access {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Scoped { user_id } => Some(*user_id),
            Self::Session(identity) => Some(identity.user_id),
            Self::Anonymous => None,
        }
    }
}

/// Try a scoped bearer token for `code`, then the identity session.
///
/// Never fails; callers decide what anonymous access means.
pub fn authenticate_optional(headers: &HeaderMap, code: &ShortCode, codec: &TokenCodec) -> Access {
    if let Some(token) = bearer_token(headers) {
        match codec
            .verify_scoped(token, code)
            .and_then(|claims| claims.user_id())
        {
            Ok(user_id) => return Access::Scoped { user_id },
            Err(e) => debug!(error = %e, %code, "Bearer token is not a scoped token for this link"),
        }
    }

    match authenticate(headers, &AuthPolicy::IDENTITY, codec) {
        Ok(auth) => Access::Session(auth.identity),
        Err(_) => Access::Anonymous,
    }
}
