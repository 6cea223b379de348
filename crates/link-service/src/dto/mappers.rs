//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.
//! Responses that embed the public short URL take the base explicitly.

use link_core::{LinkSummary, QrImage, ShortCode, ShortLink, User};

use super::responses::{
    CurrentUserResponse, LinkResponse, LinkSummaryResponse, QrGeneratedResponse, ShortenResponse,
};

/// Path of the QR image endpoint for a link
pub fn qr_code_path(code: &ShortCode) -> String {
    format!("/api/urls/{code}/qr")
}

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            provider: user.provider.clone(),
            email_verified: user.email_verified,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

impl From<User> for CurrentUserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

// ============================================================================
// Link Mappers
// ============================================================================

impl ShortenResponse {
    pub fn new(link: &ShortLink, short_url_base: &str) -> Self {
        Self {
            shortened_url: link.code.short_url(short_url_base),
            original_url: link.destination.clone(),
            short_code: link.code.to_string(),
            expires_at: link.expires_at,
        }
    }
}

impl From<&ShortLink> for LinkResponse {
    fn from(link: &ShortLink) -> Self {
        Self {
            short_code: link.code.to_string(),
            original_url: link.destination.clone(),
            status: link.status.to_string(),
            click_count: link.click_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
            expires_at: link.expires_at,
        }
    }
}

impl From<ShortLink> for LinkResponse {
    fn from(link: ShortLink) -> Self {
        Self::from(&link)
    }
}

impl From<&LinkSummary> for LinkSummaryResponse {
    fn from(summary: &LinkSummary) -> Self {
        let link = &summary.link;
        let qr = link.qr.as_ref().filter(|_| link.has_qr());

        Self {
            short_code: link.code.to_string(),
            original_url: link.destination.clone(),
            status: link.status.to_string(),
            click_count: summary.display_click_count(),
            created_at: link.created_at,
            updated_at: link.updated_at,
            expires_at: link.expires_at,
            total_visits: summary.stats.total_visits,
            unique_visitors: summary.stats.unique_visitors,
            last_visit_at: summary.stats.last_visit_at,
            last_visit_user_agent: summary.stats.last_visit_user_agent.clone(),
            qr_code_available: qr.is_some(),
            qr_code_size: qr.map(|q| q.size),
            qr_code_format: qr.map(|q| q.format.clone()),
            qr_code_generated_at: qr.map(|q| q.generated_at),
            qr_code_url: qr.map(|_| qr_code_path(&link.code)),
        }
    }
}

impl From<LinkSummary> for LinkSummaryResponse {
    fn from(summary: LinkSummary) -> Self {
        Self::from(&summary)
    }
}

impl QrGeneratedResponse {
    pub fn new(link: &ShortLink, image: &QrImage) -> Self {
        Self {
            short_code: link.code.to_string(),
            original_url: link.destination.clone(),
            qr_code_size: image.metadata.size,
            qr_code_format: image.metadata.format.clone(),
            qr_code_generated_at: image.metadata.generated_at,
            qr_code_url: qr_code_path(&link.code),
        }
    }
}
