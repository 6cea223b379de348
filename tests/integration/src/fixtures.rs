//! Test fixtures and data generators
//!
//! Provides reusable request/response shapes for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::helpers::{assert_json, TestServer};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Registration request
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            email: format!("test{suffix}@example.com"),
            password: "TestPass123!".to_string(),
            first_name: "Test".to_string(),
            last_name: format!("User{suffix}"),
        }
    }
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

/// Auth response
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// User response
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub provider: String,
}

/// Shorten request
#[derive(Debug, Default, Serialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_preset: Option<String>,
}

impl ShortenRequest {
    pub fn to(url: &str) -> Self {
        Self {
            url: url.to_string(),
            expiration_preset: None,
        }
    }
}

/// Shorten response
#[derive(Debug, Deserialize)]
pub struct ShortenResponse {
    pub shortened_url: String,
    pub original_url: String,
    pub short_code: String,
    pub expires_at: Option<String>,
}

/// Link with statistics
#[derive(Debug, Deserialize)]
pub struct LinkSummary {
    pub short_code: String,
    pub original_url: String,
    pub status: String,
    pub click_count: i64,
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub qr_code_available: bool,
}

/// QR token response
#[derive(Debug, Deserialize)]
pub struct QrTokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub qr_code_url: String,
}

/// Error envelope
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Register a fresh user and return their auth response
pub async fn register_user(server: &TestServer) -> Result<AuthResponse> {
    let response = server
        .post("/auth/register", &RegisterRequest::unique())
        .await?;
    assert_json(response, StatusCode::CREATED).await
}

/// Shorten `url` as the given user
pub async fn shorten(server: &TestServer, token: &str, url: &str) -> Result<ShortenResponse> {
    let response = server
        .post_auth("/api/shorten", token, &ShortenRequest::to(url))
        .await?;
    assert_json(response, StatusCode::CREATED).await
}

/// Statistics for one link
pub async fn stats(server: &TestServer, token: &str, code: &str) -> Result<LinkSummary> {
    let response = server
        .get_auth(&format!("/api/urls/{code}/stats"), token)
        .await?;
    assert_json(response, StatusCode::OK).await
}
