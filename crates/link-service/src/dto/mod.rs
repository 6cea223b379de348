//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    GenerateQrRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, ShortenRequest,
    UpdateLinkRequest, UpdateStatusRequest,
};

pub use responses::{
    ApiResponse, AuthResponse, CurrentUserResponse, HealthChecks, HealthResponse, LinkResponse,
    LinkSummaryResponse, MessageResponse, QrGeneratedResponse, QrTokenResponse, ReadinessResponse,
    ShortenResponse,
};

pub use mappers::qr_code_path;
