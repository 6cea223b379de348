//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Short link not found: {0}")]
    LinkNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    // =========================================================================
    // Validation Errors (request shape)
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("At least one field (url, expiration_preset, or custom_expiration) must be provided")]
    EmptyUpdate,

    #[error("Cannot provide both expiration_preset and custom_expiration. Use only one")]
    ConflictingExpiration,

    #[error("Status must be either 'active' or 'paused', got '{0}'")]
    InvalidStatus(String),

    #[error("Invalid QR code size {0}. Allowed sizes: 256, 512, 1024")]
    InvalidQrSize(u32),

    #[error("Invalid short code: {0}")]
    InvalidShortCode(String),

    // =========================================================================
    // Unprocessable Errors (well-formed request, unacceptable values)
    // =========================================================================
    #[error("{field} must be between {min} and {max}")]
    FieldOutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("Custom expiration cannot exceed 5 years (1825 days)")]
    ExpirationOutOfBounds,

    #[error("Expiration date must be in the future")]
    ExpirationNotInFuture,

    #[error("Invalid expiration preset: {0}. Valid values: 1hour, 12hours, 1day, 7days, 1month, 6months, 1year, default")]
    UnknownPreset(String),

    #[error("Invalid URL format: {0}")]
    InvalidDestination(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("You do not have permission to access this link")]
    NotLinkOwner,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Short code already exists")]
    ShortCodeTaken,

    #[error("Email already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Gone Errors
    // =========================================================================
    #[error("Link is paused")]
    LinkPaused,

    #[error("Link has expired")]
    LinkExpired,

    #[error("Cannot update URL of expired link. Update expiration to reactivate it")]
    ExpiredLinkUpdate,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Failed to allocate a unique short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("QR rendering failed: {0}")]
    RenderError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::LinkNotFound(_) => "UNKNOWN_LINK",
            Self::UserNotFound(_) => "UNKNOWN_USER",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::EmptyUpdate => "EMPTY_UPDATE",
            Self::ConflictingExpiration => "CONFLICTING_EXPIRATION",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidQrSize(_) => "INVALID_QR_SIZE",
            Self::InvalidShortCode(_) => "INVALID_SHORT_CODE",

            // Unprocessable
            Self::FieldOutOfRange { .. } => "INVALID_EXPIRATION_FIELD",
            Self::ExpirationOutOfBounds => "EXPIRATION_OUT_OF_BOUNDS",
            Self::ExpirationNotInFuture => "EXPIRATION_NOT_IN_FUTURE",
            Self::UnknownPreset(_) => "UNKNOWN_EXPIRATION_PRESET",
            Self::InvalidDestination(_) => "INVALID_URL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",

            // Authorization
            Self::NotLinkOwner => "NOT_LINK_OWNER",

            // Conflict
            Self::ShortCodeTaken => "SHORT_CODE_TAKEN",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Gone
            Self::LinkPaused => "LINK_PAUSED",
            Self::LinkExpired => "LINK_EXPIRED",
            Self::ExpiredLinkUpdate => "EXPIRED_LINK_UPDATE",

            // Business Rules
            Self::CodeSpaceExhausted { .. } => "CODE_SPACE_EXHAUSTED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::RenderError(_) => "QR_RENDER_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LinkNotFound(_) | Self::UserNotFound(_))
    }

    /// Check if this is a request-shape validation error (400)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyUpdate
                | Self::ConflictingExpiration
                | Self::InvalidStatus(_)
                | Self::InvalidQrSize(_)
                | Self::InvalidShortCode(_)
        )
    }

    /// Check if this is a value-level validation error (422)
    pub fn is_unprocessable(&self) -> bool {
        matches!(
            self,
            Self::FieldOutOfRange { .. }
                | Self::ExpirationOutOfBounds
                | Self::ExpirationNotInFuture
                | Self::UnknownPreset(_)
                | Self::InvalidDestination(_)
                | Self::WeakPassword(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotLinkOwner)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ShortCodeTaken | Self::EmailAlreadyExists)
    }

    /// Check if the target exists but can no longer be used
    pub fn is_gone(&self) -> bool {
        matches!(
            self,
            Self::LinkPaused | Self::LinkExpired | Self::ExpiredLinkUpdate
        )
    }

    /// HTTP status code equivalent for this error
    pub fn status_code(&self) -> u16 {
        if self.is_not_found() {
            404
        } else if self.is_authorization() {
            403
        } else if self.is_validation() {
            400
        } else if self.is_unprocessable() {
            422
        } else if self.is_conflict() {
            409
        } else if self.is_gone() {
            410
        } else {
            500
        }
    }
}
