//! Shared fixtures for service tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use link_common::{LinkConfig, TokenCodec};
use link_core::{
    CodeGenerator, DomainError, ExpirationRequest, ManualClock, QrRenderer, QrSize, ShortCode,
    ShortLink, UserId, QR_FORMAT_PNG,
};
use link_db::{InMemoryLinkRepository, InMemoryUserRepository};

use super::{LinkService, ServiceContext, ServiceContextBuilder};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

pub fn code(raw: &str) -> ShortCode {
    ShortCode::parse(raw).unwrap()
}

/// Yields the scripted codes in order, then repeats the last one
pub struct ScriptedGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| (*c).to_string()).collect()),
            last: Mutex::new(codes.last().copied().unwrap_or("Zzzzzz").to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodeGenerator for ScriptedGenerator {
    fn generate(&self) -> ShortCode {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.codes.lock().unwrap().pop_front();
        let raw = next.unwrap_or_else(|| self.last.lock().unwrap().clone());
        code(&raw)
    }
}

/// Renders `"{size}:{payload}"` and counts calls
#[derive(Default)]
pub struct EchoRenderer {
    calls: AtomicUsize,
}

impl EchoRenderer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QrRenderer for EchoRenderer {
    fn format(&self) -> &'static str {
        QR_FORMAT_PNG
    }

    fn render(&self, data: &str, size: QrSize) -> Result<Vec<u8>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}:{data}", size.pixels()).into_bytes())
    }
}

pub struct Harness {
    pub ctx: ServiceContext,
    pub links: InMemoryLinkRepository,
    pub users: InMemoryUserRepository,
    pub clock: Arc<ManualClock>,
    pub generator: Arc<ScriptedGenerator>,
    pub renderer: Arc<EchoRenderer>,
    user_id: UserId,
}

impl Harness {
    pub fn new(codes: &[&str]) -> Self {
        let links = InMemoryLinkRepository::new();
        let users = InMemoryUserRepository::new();
        let clock = Arc::new(ManualClock::new(t0()));
        let generator = Arc::new(ScriptedGenerator::new(codes));
        let renderer = Arc::new(EchoRenderer::default());
        let codec = TokenCodec::new(
            "service-test-secret",
            "url-shortener-backend",
            Duration::hours(24),
            Duration::minutes(5),
            clock.clone(),
        );

        let ctx = ServiceContextBuilder::new()
            .link_repo(Arc::new(links.clone()))
            .user_repo(Arc::new(users.clone()))
            .code_generator(generator.clone())
            .qr_renderer(renderer.clone())
            .clock(clock.clone())
            .token_codec(Arc::new(codec))
            .links(LinkConfig {
                short_url_base: "https://sho.rt".to_string(),
                max_code_attempts: 10,
            })
            .build()
            .unwrap();

        Self {
            ctx,
            links,
            users,
            clock,
            generator,
            renderer,
            user_id: UserId::generate(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Create a link to example.com with the default lifetime
    pub async fn create_link(&self, owner_id: UserId) -> ShortLink {
        LinkService::new(&self.ctx)
            .create_link("example.com", owner_id, &ExpirationRequest::default())
            .await
            .unwrap()
    }
}
