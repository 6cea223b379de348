//! Non-persistence ports: time, randomness and QR rendering

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::Rng;

use crate::error::DomainError;
use crate::value_objects::{QrSize, ShortCode, ALPHABET, SHORT_CODE_LENGTH};

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

// ============================================================================
// Code generation
// ============================================================================

/// Source of candidate short codes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> ShortCode;
}

/// Uniform codes from the operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureCodeGenerator;

impl CodeGenerator for SecureCodeGenerator {
    fn generate(&self) -> ShortCode {
        let mut rng = OsRng;
        let bytes = (0..SHORT_CODE_LENGTH)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect();
        ShortCode::from_alphabet(bytes)
    }
}

// ============================================================================
// QR rendering
// ============================================================================

/// Renders a payload into an image of the requested edge length
pub trait QrRenderer: Send + Sync {
    /// Output format tag stored with the image
    fn format(&self) -> &'static str;

    fn render(&self, data: &str, size: QrSize) -> Result<Vec<u8>, DomainError>;
}
