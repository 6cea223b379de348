//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the configuration, and the rate limiter instance guarding the account
//! endpoints.

use std::sync::Arc;

use link_common::{AppConfig, TokenCodec};
use link_service::ServiceContext;

use crate::middleware::SlidingWindowLimiter;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Application configuration
    config: Arc<AppConfig>,
    /// Limiter for the register/login endpoints
    rate_limiter: Arc<SlidingWindowLimiter>,
}

impl AppState {
    /// Create a new AppState with a limiter built from the configuration
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        let rate_limiter = Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit));
        Self::with_rate_limiter(service_context, config, rate_limiter)
    }

    /// Create a new AppState around an existing limiter
    pub fn with_rate_limiter(
        service_context: ServiceContext,
        config: AppConfig,
        rate_limiter: Arc<SlidingWindowLimiter>,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            rate_limiter,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the token codec from the service context
    pub fn token_codec(&self) -> &TokenCodec {
        self.service_context.token_codec()
    }

    pub fn rate_limiter(&self) -> &Arc<SlidingWindowLimiter> {
        &self.rate_limiter
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}
