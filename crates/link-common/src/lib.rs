//! # link-common
//!
//! Shared infrastructure: configuration, error handling, token signing,
//! password hashing, QR rendering, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod qr;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, validate_password_strength, verify_password, Claims, PasswordService,
    ScopedClaims, TokenCodec, TokenError,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CookieConfig, CorsConfig, DatabaseConfig, Environment,
    HttpConfig, JwtConfig, LinkConfig, RateLimitConfig, ServerConfig, MIN_CODE_ATTEMPTS,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use qr::PngQrRenderer;
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
