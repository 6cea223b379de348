//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CookieConfig, CorsConfig, DatabaseConfig, Environment,
    HttpConfig, JwtConfig, LinkConfig, RateLimitConfig, ServerConfig, MIN_CODE_ATTEMPTS,
};
