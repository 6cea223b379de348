//! API Integration Tests
//!
//! Each test spawns the full application on an ephemeral port with
//! in-memory repositories, so no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, header, register_user, set_cookies, shorten, stats,
    test_config, AuthResponse, ErrorBody, LinkSummary, LoginRequest, QrTokenResponse,
    RegisterRequest, TestServer,
};
use reqwest::{Method, StatusCode};
use serde_json::json;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health").await.unwrap();
    assert!(!header(&response, "x-request-id").is_empty());
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_sets_identity_cookie() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique();

    let response = server.post("/auth/register", &request).await.unwrap();
    let cookies = set_cookies(&response);
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(auth.user.email, request.email);
    assert_eq!(auth.token_type, "Bearer");
    assert!(!auth.token.is_empty());
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("auth_token=") && c.contains("HttpOnly")));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique();

    server.post("/auth/register", &request).await.unwrap();
    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_login_and_me() {
    let server = TestServer::start().await.unwrap();
    let register_req = RegisterRequest::unique();
    server.post("/auth/register", &register_req).await.unwrap();

    let response = server
        .post("/auth/login", &LoginRequest::from_register(&register_req))
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth("/auth/me", &auth.token).await.unwrap();
    let me: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me["email"], register_req.email);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = TestServer::start().await.unwrap();
    let login_req = LoginRequest {
        email: "nobody@example.com".to_string(),
        password: "wrongpass".to_string(),
    };

    let response = server.post("/auth/login", &login_req).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();

    let response = server
        .post("/auth/refresh", &json!({ "token": auth.token }))
        .await
        .unwrap();
    let refreshed: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(refreshed.user.id, auth.user.id);
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let config = test_config(&[("RATE_LIMIT_MAX_REQUESTS", "3")]).unwrap();
    let server = TestServer::start_with_config(config).await.unwrap();
    let login_req = LoginRequest {
        email: "nobody@example.com".to_string(),
        password: "wrongpass".to_string(),
    };

    for _ in 0..3 {
        let response = server.post("/auth/login", &login_req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = server.post("/auth/login", &login_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(header(&response, "retry-after").parse::<u64>().unwrap() > 0);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error.code, "RATE_LIMIT_EXCEEDED");

    // Other routes are not limited
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_rate_limit_keys_on_peer_when_proxy_untrusted() {
    let config = test_config(&[
        ("RATE_LIMIT_MAX_REQUESTS", "2"),
        ("TRUST_PROXY_HEADERS", "false"),
    ])
    .unwrap();
    let server = TestServer::start_with_config(config).await.unwrap();
    let login_req = LoginRequest {
        email: "nobody@example.com".to_string(),
        password: "wrongpass".to_string(),
    };

    let mut statuses = Vec::new();
    for hop in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        let response = server
            .request(Method::POST, "/auth/login")
            .header("X-Forwarded-For", hop)
            .json(&login_req)
            .send()
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(
        statuses,
        [
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
}

// ============================================================================
// Gateway Tests
// ============================================================================

#[tokio::test]
async fn test_api_without_token_is_json_401() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .request(Method::GET, "/api/urls")
        .header("Accept", "text/html")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(header(&response, "cache-control").contains("no-store"));
    assert_eq!(header(&response, "pragma"), "no-cache");
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error.code, "MISSING_AUTH");
}

#[tokio::test]
async fn test_invalid_token_gets_challenge() {
    let server = TestServer::start().await.unwrap();

    let response = server.get_auth("/api/urls", "not-a-token").await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(header(&response, "www-authenticate").contains("invalid_token"));
}

#[tokio::test]
async fn test_browser_is_redirected_to_login_page() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .request(Method::GET, "/swagger?tab=links")
        .header("Accept", "text/html")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        header(&response, "location"),
        "/auth/login-page?redirect=%2Fswagger%3Ftab%3Dlinks"
    );
    assert!(header(&response, "cache-control").contains("no-store"));
}

#[tokio::test]
async fn test_login_page_is_public() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .get("/auth/login-page?redirect=/swagger")
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"const redirectTo = "/swagger";"#));
}

#[tokio::test]
async fn test_docs_and_identity_cookies_are_isolated() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();

    // Identity cookie does not open the documentation
    let response = server
        .request(Method::GET, "/swagger/routes.json")
        .header("Accept", "application/json")
        .header("Cookie", format!("auth_token={}", auth.token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Documentation cookie does not open the API
    let response = server
        .get_with_cookie("/api/urls", "swagger_auth_token", &auth.token)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Each cookie opens its own surface
    let response = server
        .get_with_cookie("/swagger/routes.json", "swagger_auth_token", &auth.token)
        .await
        .unwrap();
    let catalogue: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!catalogue["routes"].as_array().unwrap().is_empty());

    let response = server
        .get_with_cookie("/api/urls", "auth_token", &auth.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_docs_login_sets_docs_cookie() {
    let server = TestServer::start().await.unwrap();
    let register_req = RegisterRequest::unique();
    server.post("/auth/register", &register_req).await.unwrap();

    let response = server
        .post(
            "/auth/login?docs=true",
            &LoginRequest::from_register(&register_req),
        )
        .await
        .unwrap();
    let cookies = set_cookies(&response);

    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookies.iter().any(|c| c.starts_with("swagger_auth_token=")));
    assert!(!cookies.iter().any(|c| c.starts_with("auth_token=")));

    let response = server.post("/auth/docs/logout", &json!({})).await.unwrap();
    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("swagger_auth_token=;") && c.contains("Max-Age=0")));
}

// ============================================================================
// Link Tests
// ============================================================================

#[tokio::test]
async fn test_shorten_and_list() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();

    let link = shorten(&server, &auth.token, "example.com/page").await.unwrap();
    assert_eq!(link.original_url, "https://example.com/page");
    assert_eq!(
        link.shortened_url,
        format!("http://sho.rt/{}", link.short_code)
    );
    assert!(link.expires_at.is_some());

    let response = server.get_auth("/api/urls", &auth.token).await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    let links = body["data"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["short_code"], link.short_code.as_str());
}

#[tokio::test]
async fn test_shorten_rejects_conflicting_expiration() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();

    let response = server
        .post_auth(
            "/api/shorten",
            &auth.token,
            &json!({
                "url": "example.com",
                "expiration_preset": "7days",
                "custom_expiration": { "days": "3" }
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_links_are_private_to_their_owner() {
    let server = TestServer::start().await.unwrap();
    let owner = register_user(&server).await.unwrap();
    let other = register_user(&server).await.unwrap();
    let link = shorten(&server, &owner.token, "example.com").await.unwrap();

    let response = server
        .get_auth(&format!("/api/urls/{}/stats", link.short_code), &other.token)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server.get_auth("/api/urls", &other.token).await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_destination() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let link = shorten(&server, &auth.token, "example.com").await.unwrap();

    let response = server
        .put_auth(
            &format!("/api/urls/{}", link.short_code),
            &auth.token,
            &json!({ "url": "https://example.org/new" }),
        )
        .await
        .unwrap();
    let updated: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated["original_url"], "https://example.org/new");

    let response = server.get(&format!("/{}", link.short_code)).await.unwrap();
    assert_eq!(header(&response, "location"), "https://example.org/new");
}

#[tokio::test]
async fn test_delete_link() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let link = shorten(&server, &auth.token, "example.com").await.unwrap();
    let path = format!("/api/urls/{}", link.short_code);

    let response = server.delete_auth(&path, &auth.token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth(&path, &auth.token).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Redirect Tests
// ============================================================================

#[tokio::test]
async fn test_head_does_not_count_but_get_does() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let link = shorten(&server, &auth.token, "example.com/landing").await.unwrap();
    let path = format!("/{}", link.short_code);

    let response = server.head(&path).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "location"), "https://example.com/landing");

    let summary = stats(&server, &auth.token, &link.short_code).await.unwrap();
    assert_eq!(summary.total_visits, 0);
    assert_eq!(summary.click_count, 0);

    let response = server
        .request(Method::GET, &path)
        .header("User-Agent", "integration-test")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), "https://example.com/landing");

    let summary: LinkSummary = stats(&server, &auth.token, &link.short_code).await.unwrap();
    assert_eq!(summary.total_visits, 1);
    assert_eq!(summary.click_count, 1);
    assert_eq!(summary.unique_visitors, 1);
}

#[tokio::test]
async fn test_paused_link_is_gone() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let link = shorten(&server, &auth.token, "example.com").await.unwrap();

    let response = server
        .patch_auth(
            &format!("/api/urls/{}/status", link.short_code),
            &auth.token,
            &json!({ "status": "paused" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get(&format!("/{}", link.short_code)).await.unwrap();
    assert_eq!(response.status(), StatusCode::GONE);

    let response = server
        .patch_auth(
            &format!("/api/urls/{}/status", link.short_code),
            &auth.token,
            &json!({ "status": "active" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get(&format!("/{}", link.short_code)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_unknown_and_reserved_codes_are_not_found() {
    let server = TestServer::start().await.unwrap();

    for path in ["/Zz9Zz9", "/api", "/auth", "/favicon.ico", "/robots.txt"] {
        let response = server.get(path).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
    }
}

// ============================================================================
// QR Tests
// ============================================================================

#[tokio::test]
async fn test_qr_image_for_owner() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let link = shorten(&server, &auth.token, "example.com").await.unwrap();

    let response = server
        .get_auth(&format!("/api/urls/{}/qr?download=true", link.short_code), &auth.token)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/png");
    assert!(header(&response, "content-disposition").starts_with("attachment;"));
    let bytes = response.bytes().await.unwrap();
    assert_eq!(&bytes[1..4], b"PNG");

    let summary = stats(&server, &auth.token, &link.short_code).await.unwrap();
    assert!(summary.qr_code_available);
}

#[tokio::test]
async fn test_qr_token_grants_image_access_for_its_link_only() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let first = shorten(&server, &auth.token, "example.com/one").await.unwrap();
    let second = shorten(&server, &auth.token, "example.com/two").await.unwrap();

    let response = server
        .post_auth(
            &format!("/api/urls/{}/qr-token", first.short_code),
            &auth.token,
            &json!({}),
        )
        .await
        .unwrap();
    let qr: QrTokenResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(qr.token_type, "Bearer");
    assert!(qr.expires_in > 0);
    assert_eq!(qr.qr_code_url, format!("/api/urls/{}/qr", first.short_code));

    let response = server.get_auth(&qr.qr_code_url, &qr.token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Scoped to the first link
    let response = server
        .get_auth(&format!("/api/urls/{}/qr", second.short_code), &qr.token)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Not a session token
    let response = server.get_auth("/api/urls", &qr.token).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_qr_image_requires_some_credential() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let link = shorten(&server, &auth.token, "example.com").await.unwrap();

    let response = server
        .get(&format!("/api/urls/{}/qr", link.short_code))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_regenerate_qr_with_size() {
    let server = TestServer::start().await.unwrap();
    let auth = register_user(&server).await.unwrap();
    let link = shorten(&server, &auth.token, "example.com").await.unwrap();

    let response = server
        .post_auth(
            &format!("/api/urls/{}/qr?size=512", link.short_code),
            &auth.token,
            &json!({ "size": 128 }),
        )
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["qr_code_size"], 512);
    assert_eq!(body["qr_code_format"], "png");
}
