//! Service context - dependency container for services
//!
//! Holds the repositories, token codec, and the clock/random/render ports
//! needed by services.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use link_common::auth::PasswordService;
use link_common::{LinkConfig, PngQrRenderer, TokenCodec, MIN_CODE_ATTEMPTS};
use link_core::traits::{
    Clock, CodeGenerator, LinkRepository, QrRenderer, SecureCodeGenerator, SystemClock,
    UserRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Link and user repositories
/// - Token codec for identity and QR tokens
/// - Code generator, QR renderer and clock ports
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    link_repo: Arc<dyn LinkRepository>,
    user_repo: Arc<dyn UserRepository>,

    // Ports
    code_generator: Arc<dyn CodeGenerator>,
    qr_renderer: Arc<dyn QrRenderer>,
    clock: Arc<dyn Clock>,

    // Services
    token_codec: Arc<TokenCodec>,
    passwords: PasswordService,

    // Settings
    links: LinkConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        link_repo: Arc<dyn LinkRepository>,
        user_repo: Arc<dyn UserRepository>,
        code_generator: Arc<dyn CodeGenerator>,
        qr_renderer: Arc<dyn QrRenderer>,
        clock: Arc<dyn Clock>,
        token_codec: Arc<TokenCodec>,
        mut links: LinkConfig,
    ) -> Self {
        links.max_code_attempts = links.max_code_attempts.max(MIN_CODE_ATTEMPTS);

        Self {
            link_repo,
            user_repo,
            code_generator,
            qr_renderer,
            clock,
            token_codec,
            passwords: PasswordService::new(),
            links,
        }
    }

    // === Repositories ===

    /// Get the link repository
    pub fn link_repo(&self) -> &dyn LinkRepository {
        self.link_repo.as_ref()
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    // === Ports ===

    pub fn code_generator(&self) -> &dyn CodeGenerator {
        self.code_generator.as_ref()
    }

    pub fn qr_renderer(&self) -> &dyn QrRenderer {
        self.qr_renderer.as_ref()
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // === Services ===

    /// Get the token codec
    pub fn token_codec(&self) -> &TokenCodec {
        self.token_codec.as_ref()
    }

    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    // === Settings ===

    /// Base of public short URLs and QR payloads
    pub fn short_url_base(&self) -> &str {
        &self.links.short_url_base
    }

    /// Collision retry bound for code allocation
    pub fn max_code_attempts(&self) -> u32 {
        self.links.max_code_attempts
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("qr_format", &self.qr_renderer.format())
            .field("links", &self.links)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// Repositories and the token codec are required; the ports fall back to
/// the production implementations.
pub struct ServiceContextBuilder {
    link_repo: Option<Arc<dyn LinkRepository>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    code_generator: Option<Arc<dyn CodeGenerator>>,
    qr_renderer: Option<Arc<dyn QrRenderer>>,
    clock: Option<Arc<dyn Clock>>,
    token_codec: Option<Arc<TokenCodec>>,
    links: LinkConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            link_repo: None,
            user_repo: None,
            code_generator: None,
            qr_renderer: None,
            clock: None,
            token_codec: None,
            links: LinkConfig::default(),
        }
    }

    pub fn link_repo(mut self, repo: Arc<dyn LinkRepository>) -> Self {
        self.link_repo = Some(repo);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn code_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.code_generator = Some(generator);
        self
    }

    pub fn qr_renderer(mut self, renderer: Arc<dyn QrRenderer>) -> Self {
        self.qr_renderer = Some(renderer);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn token_codec(mut self, codec: Arc<TokenCodec>) -> Self {
        self.token_codec = Some(codec);
        self
    }

    pub fn links(mut self, links: LinkConfig) -> Self {
        self.links = links;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.link_repo
                .ok_or_else(|| ServiceError::validation("link_repo is required"))?,
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.code_generator
                .unwrap_or_else(|| Arc::new(SecureCodeGenerator)),
            self.qr_renderer
                .unwrap_or_else(|| Arc::new(PngQrRenderer)),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.token_codec
                .ok_or_else(|| ServiceError::validation("token_codec is required"))?,
            self.links,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
