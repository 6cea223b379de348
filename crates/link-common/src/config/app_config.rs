//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present).

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub http: HttpConfig,
    pub cookie: CookieConfig,
    pub links: LinkConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// Listen address
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub expiry_hours: i64,
    pub qr_token_expiry_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("expiry_hours", &self.expiry_hours)
            .field("qr_token_expiry_minutes", &self.qr_token_expiry_minutes)
            .finish()
    }
}

/// Sliding-window rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
    pub sweep_interval_secs: u64,
}

impl RateLimitConfig {
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Per-request behaviour
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    ///
    /// Those headers are caller-controlled unless a reverse proxy rewrites
    /// them, so turn this off when the service is reachable directly;
    /// otherwise a client can pick its own rate-limit key.
    pub trust_proxy_headers: bool,
}

impl HttpConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Auth cookie attributes
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub domain: Option<String>,
    pub max_age_secs: i64,
    pub secure: bool,
}

/// Short link settings
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub short_url_base: String,
    pub max_code_attempts: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            short_url_base: default_short_url_base(),
            max_code_attempts: MIN_CODE_ATTEMPTS,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "link-shortener".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_issuer() -> String {
    "url-shortener-backend".to_string()
}

fn default_short_url_base() -> String {
    "https://www.sniply.co.in".to_string()
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_MIN_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_QR_TOKEN_EXPIRY_MINUTES: i64 = 5;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: usize = 5;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_RATE_LIMIT_SWEEP_SECS: u64 = 5 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_COOKIE_MAX_AGE_SECS: i64 = 3600;
const PRODUCTION_COOKIE_DOMAIN: &str = ".sniply.co.in";

/// Lowest accepted collision retry bound
pub const MIN_CODE_ATTEMPTS: u32 = 10;

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// a value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env: Environment = match get("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let secret = get("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?;

        let cookie_domain = get("COOKIE_DOMAIN").or_else(|| {
            env.is_production()
                .then(|| PRODUCTION_COOKIE_DOMAIN.to_string())
        });

        let short_url_base = get("SHORT_URL_BASE")
            .or_else(|| get("FRONTEND_URL"))
            .unwrap_or_else(default_short_url_base);

        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ServerConfig {
                host: get("API_HOST").unwrap_or_else(default_host),
                port: parse_or(&get, "API_PORT", DEFAULT_PORT)?,
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
                min_connections: parse_or(&get, "DATABASE_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?,
            },
            jwt: JwtConfig {
                secret,
                issuer: get("JWT_ISSUER").unwrap_or_else(default_issuer),
                expiry_hours: parse_or(&get, "JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
                qr_token_expiry_minutes: parse_or(
                    &get,
                    "QR_TOKEN_EXPIRY_MINUTES",
                    DEFAULT_QR_TOKEN_EXPIRY_MINUTES,
                )?,
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_or(&get, "RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS)?,
                window_secs: parse_or(&get, "RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW_SECS)?,
                sweep_interval_secs: parse_or(&get, "RATE_LIMIT_SWEEP_SECS", DEFAULT_RATE_LIMIT_SWEEP_SECS)?,
            },
            http: HttpConfig {
                request_timeout_secs: parse_or(&get, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
                trust_proxy_headers: parse_or(&get, "TRUST_PROXY_HEADERS", true)?,
            },
            cookie: CookieConfig {
                domain: cookie_domain,
                max_age_secs: parse_or(&get, "COOKIE_MAX_AGE_SECS", DEFAULT_COOKIE_MAX_AGE_SECS)?,
                secure: env.is_production(),
            },
            links: LinkConfig {
                short_url_base: short_url_base.trim_end_matches('/').to_string(),
                max_code_attempts: parse_or(&get, "SHORT_CODE_MAX_ATTEMPTS", MIN_CODE_ATTEMPTS)?
                    .max(MIN_CODE_ATTEMPTS),
            },
            cors: CorsConfig {
                allowed_origins: get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
