//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth Responses
// ============================================================================

/// Authentication response carrying a fresh identity token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

impl AuthResponse {
    pub fn new(token: String, expires_in: i64, user: CurrentUserResponse) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

/// The authenticated account
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub provider: String,
    pub email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Link Responses
// ============================================================================

/// Result of shortening a URL
#[derive(Debug, Clone, Serialize)]
pub struct ShortenResponse {
    pub shortened_url: String,
    pub original_url: String,
    pub short_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A single link
#[derive(Debug, Clone, Serialize)]
pub struct LinkResponse {
    pub short_code: String,
    pub original_url: String,
    pub status: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A link with visit statistics and QR availability
#[derive(Debug, Clone, Serialize)]
pub struct LinkSummaryResponse {
    pub short_code: String,
    pub original_url: String,
    pub status: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub last_visit_user_agent: Option<String>,
    pub qr_code_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_generated_at: Option<DateTime<Utc>>,
    /// Path of the QR image endpoint, when an image is cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
}

/// Metadata of a freshly rendered QR image
#[derive(Debug, Clone, Serialize)]
pub struct QrGeneratedResponse {
    pub short_code: String,
    pub original_url: String,
    pub qr_code_size: u32,
    pub qr_code_format: String,
    pub qr_code_generated_at: DateTime<Utc>,
    pub qr_code_url: String,
}

/// Short-lived token for fetching one link's QR image
#[derive(Debug, Clone, Serialize)]
pub struct QrTokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub qr_code_url: String,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
