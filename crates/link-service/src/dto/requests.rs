//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`, and those with free-form input
//! implement `Validate`.

use link_core::{CustomExpiration, DomainError, ExpirationPreset, ExpirationRequest};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

/// User login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

// ============================================================================
// Link Requests
// ============================================================================

/// Shorten a URL
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// One of the preset names, or "default"
    #[serde(default)]
    pub expiration_preset: Option<String>,

    #[serde(default)]
    pub custom_expiration: Option<CustomExpiration>,
}

impl ShortenRequest {
    /// Expiration inputs; none given means the default lifetime
    pub fn expiration(&self) -> Result<ExpirationRequest, DomainError> {
        parse_expiration(
            self.expiration_preset.as_deref(),
            self.custom_expiration.as_ref(),
        )
        .map(Option::unwrap_or_default)
    }
}

/// Change a link's destination and/or expiration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(max = 2048, message = "URL must be at most 2048 characters"))]
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub expiration_preset: Option<String>,

    #[serde(default)]
    pub custom_expiration: Option<CustomExpiration>,
}

impl UpdateLinkRequest {
    /// New destination, if one was supplied
    pub fn destination(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    /// Requested expiration change, if any
    pub fn expiration_change(&self) -> Result<Option<ExpirationRequest>, DomainError> {
        parse_expiration(
            self.expiration_preset.as_deref(),
            self.custom_expiration.as_ref(),
        )
    }
}

/// Pause or resume a link
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Regenerate a QR image
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenerateQrRequest {
    #[serde(default)]
    pub size: Option<u32>,
}

/// Interpret the raw expiration fields of a request.
///
/// A non-empty preset (including "default") together with a custom duration
/// is rejected. `Ok(None)` means the request carries no expiration at all.
fn parse_expiration(
    preset: Option<&str>,
    custom: Option<&CustomExpiration>,
) -> Result<Option<ExpirationRequest>, DomainError> {
    let preset = preset.map(str::trim).filter(|p| !p.is_empty());

    match (preset, custom) {
        (Some(_), Some(_)) => Err(DomainError::ConflictingExpiration),
        (None, None) => Ok(None),
        (preset, custom) => Ok(Some(ExpirationRequest {
            preset: preset
                .map(ExpirationPreset::parse_optional)
                .transpose()?
                .flatten(),
            custom: custom.cloned(),
        })),
    }
}
