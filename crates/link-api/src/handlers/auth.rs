//! Authentication handlers
//!
//! Endpoints for registration, login, logout, token refresh and the login
//! form used by the documentation surface. Successful logins set an
//! HttpOnly cookie in addition to returning the token.

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use link_common::CookieConfig;
use link_service::dto::{
    AuthResponse, CurrentUserResponse, LoginRequest, MessageResponse, RefreshTokenRequest,
    RegisterRequest,
};
use link_service::AuthService;
use serde::Deserialize;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::middleware::{AUTH_COOKIE, DOCS_COOKIE};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

const DEFAULT_LOGIN_REDIRECT: &str = "/swagger";

fn session_cookie(name: &'static str, token: String, config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.max_age_secs))
        .secure(config.secure);

    if let Some(domain) = &config.domain {
        cookie = cookie.domain(domain.clone());
    }

    cookie.build()
}

fn expired_cookie(name: &'static str, config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO);

    if let Some(domain) = &config.domain {
        cookie = cookie.domain(domain.clone());
    }

    cookie.build()
}

/// Register a new user
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(CookieJar, Created<Json<AuthResponse>>)> {
    let service = AuthService::new(state.service_context());
    let response = service.register(request).await?;

    let jar = jar.add(session_cookie(
        AUTH_COOKIE,
        response.token.clone(),
        &state.config().cookie,
    ));
    Ok((jar, Created(Json(response))))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    /// Sign in to the documentation surface instead of the application
    #[serde(default)]
    pub docs: bool,
}

/// Login with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = AuthService::new(state.service_context());
    let response = service.login(request).await?;

    let name = if params.docs { DOCS_COOKIE } else { AUTH_COOKIE };
    let jar = jar.add(session_cookie(
        name,
        response.token.clone(),
        &state.config().cookie,
    ));
    Ok((jar, Json(response)))
}

/// Exchange a valid token for a fresh one
///
/// POST /auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = AuthService::new(state.service_context());
    let response = service.refresh(&request.token).await?;

    let jar = jar.add(session_cookie(
        AUTH_COOKIE,
        response.token.clone(),
        &state.config().cookie,
    ));
    Ok((jar, Json(response)))
}

/// Clear the application session cookie
///
/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(expired_cookie(AUTH_COOKIE, &state.config().cookie));
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

/// Clear the documentation session cookie only
///
/// POST /auth/docs/logout
pub async fn docs_logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(expired_cookie(DOCS_COOKIE, &state.config().cookie));
    (
        jar,
        Json(MessageResponse::new("Logged out from documentation")),
    )
}

/// Profile of the authenticated user
///
/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = AuthService::new(state.service_context());
    Ok(Json(service.me(auth.user_id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageParams {
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Only same-origin absolute paths are followed after login
fn safe_redirect(target: Option<&str>) -> &str {
    match target.map(str::trim) {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && t != "/" => t,
        _ => DEFAULT_LOGIN_REDIRECT,
    }
}

/// Minimal login form for the documentation surface
///
/// GET /auth/login-page
pub async fn login_page(Query(params): Query<LoginPageParams>) -> Html<String> {
    let target = safe_redirect(params.redirect.as_deref());
    let target_js = serde_json::to_string(target)
        .unwrap_or_else(|_| format!("\"{DEFAULT_LOGIN_REDIRECT}\""))
        .replace('<', "\\u003c");

    Html(LOGIN_PAGE_TEMPLATE.replace("{{REDIRECT}}", &target_js))
}

const LOGIN_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Sign in</title>
</head>
<body>
<h1>Sign in to the API documentation</h1>
<form id="login">
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Sign in</button>
  <p id="error" role="alert"></p>
</form>
<script>
const redirectTo = {{REDIRECT}};
document.getElementById("login").addEventListener("submit", async (event) => {
  event.preventDefault();
  const form = new FormData(event.target);
  const response = await fetch("/auth/login?docs=true", {
    method: "POST",
    credentials: "same-origin",
    headers: { "Content-Type": "application/json", "Accept": "application/json" },
    body: JSON.stringify({ email: form.get("email"), password: form.get("password") }),
  });
  if (response.ok) {
    window.location.href = redirectTo;
  } else {
    const body = await response.json().catch(() => ({}));
    document.getElementById("error").textContent =
      (body.error && body.error.message) || "Login failed";
  }
});
</script>
</body>
</html>
"#;
