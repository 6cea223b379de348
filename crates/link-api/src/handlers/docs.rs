//! API documentation surface
//!
//! A route catalogue served as HTML and JSON behind the documentation
//! gateway.

use std::fmt::Write;

use axum::{response::Html, Json};
use serde::Serialize;

/// Who may call a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAuth {
    Public,
    Identity,
    /// Identity session or a scoped QR token
    IdentityOrQrToken,
    Docs,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub auth: RouteAuth,
    pub summary: &'static str,
}

const fn route(
    method: &'static str,
    path: &'static str,
    auth: RouteAuth,
    summary: &'static str,
) -> RouteDoc {
    RouteDoc {
        method,
        path,
        auth,
        summary,
    }
}

pub const ROUTES: &[RouteDoc] = &[
    route("GET", "/health", RouteAuth::Public, "Liveness probe"),
    route("GET", "/health/ready", RouteAuth::Public, "Readiness probe"),
    route("POST", "/auth/register", RouteAuth::Public, "Create an account"),
    route("POST", "/auth/login", RouteAuth::Public, "Sign in; ?docs=true sets the documentation cookie"),
    route("POST", "/auth/refresh", RouteAuth::Public, "Exchange a valid token for a fresh one"),
    route("POST", "/auth/logout", RouteAuth::Public, "Clear the session cookie"),
    route("POST", "/auth/docs/logout", RouteAuth::Public, "Clear the documentation cookie"),
    route("GET", "/auth/me", RouteAuth::Identity, "Current user profile"),
    route("GET", "/auth/login-page", RouteAuth::Public, "Documentation login form"),
    route("POST", "/api/shorten", RouteAuth::Identity, "Create a short link"),
    route("GET", "/api/urls", RouteAuth::Identity, "List your links with visit counts"),
    route("GET", "/api/urls/{code}", RouteAuth::Identity, "Link details"),
    route("PUT", "/api/urls/{code}", RouteAuth::Identity, "Change destination or expiration"),
    route("DELETE", "/api/urls/{code}", RouteAuth::Identity, "Delete a link and its visits"),
    route("PATCH", "/api/urls/{code}/status", RouteAuth::Identity, "Pause or resume a link"),
    route("GET", "/api/urls/{code}/stats", RouteAuth::Identity, "Visit statistics"),
    route("GET", "/api/urls/{code}/qr", RouteAuth::IdentityOrQrToken, "QR image; ?download=true for an attachment"),
    route("POST", "/api/urls/{code}/qr", RouteAuth::Identity, "Re-render the QR image"),
    route("POST", "/api/urls/{code}/qr-token", RouteAuth::Identity, "Issue a scoped QR token"),
    route("GET", "/swagger", RouteAuth::Docs, "This page"),
    route("GET", "/swagger/routes.json", RouteAuth::Docs, "Route catalogue as JSON"),
    route("GET", "/{code}", RouteAuth::Public, "Redirect to the destination and count a visit"),
    route("HEAD", "/{code}", RouteAuth::Public, "Destination lookup without counting a visit"),
];

#[derive(Debug, Serialize)]
pub struct RouteCatalogue {
    pub routes: &'static [RouteDoc],
}

/// GET /swagger/routes.json
pub async fn routes_json() -> Json<RouteCatalogue> {
    Json(RouteCatalogue { routes: ROUTES })
}

/// GET /swagger
pub async fn index() -> Html<String> {
    Html(render_index(ROUTES))
}

fn auth_label(auth: RouteAuth) -> &'static str {
    match auth {
        RouteAuth::Public => "public",
        RouteAuth::Identity => "session",
        RouteAuth::IdentityOrQrToken => "session or QR token",
        RouteAuth::Docs => "docs session",
    }
}

fn render_index(routes: &[RouteDoc]) -> String {
    let mut rows = String::new();
    for r in routes {
        let _ = writeln!(
            rows,
            "<tr><td><code>{}</code></td><td><code>{}</code></td><td>{}</td><td>{}</td></tr>",
            r.method,
            r.path,
            auth_label(r.auth),
            r.summary
        );
    }

    INDEX_TEMPLATE.replace("{{ROWS}}", &rows)
}

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>API documentation</title>
</head>
<body>
<h1>API documentation</h1>
<p>Machine-readable catalogue: <a href="/swagger/routes.json">routes.json</a></p>
<table>
<thead><tr><th>Method</th><th>Path</th><th>Auth</th><th>Summary</th></tr></thead>
<tbody>
{{ROWS}}</tbody>
</table>
<form method="post" action="/auth/docs/logout"><button type="submit">Sign out</button></form>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_serializes_auth_in_snake_case() {
        let json = serde_json::to_value(RouteCatalogue { routes: ROUTES }).unwrap();
        let routes = json["routes"].as_array().unwrap();

        let qr = routes
            .iter()
            .find(|r| r["method"] == "GET" && r["path"] == "/api/urls/{code}/qr")
            .unwrap();
        assert_eq!(qr["auth"], "identity_or_qr_token");
    }

    #[test]
    fn test_index_lists_every_route() {
        let page = render_index(ROUTES);
        assert_eq!(page.matches("<tr><td>").count(), ROUTES.len());
        assert!(page.contains("/api/urls/{code}/qr-token"));
        assert!(!page.contains("{{ROWS}}"));
    }
}
