//! Short code - the opaque identifier a short link is addressed by

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Alphabet codes are drawn from
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated codes
pub const SHORT_CODE_LENGTH: usize = 6;

/// Upper bound enforced by the `urls.short_code` column
pub const MAX_SHORT_CODE_LENGTH: usize = 10;

/// First path segments that never resolve as short codes
pub const RESERVED_PATHS: &[&str] = &[
    "swagger",
    "api",
    "auth",
    "health",
    "favicon.ico",
    "robots.txt",
];

/// Validated short code
///
/// Deserialization goes through [`ShortCode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Validate a code coming from a request path
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SHORT_CODE_LENGTH
            && raw.bytes().all(|b| b.is_ascii_alphanumeric());

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidShortCode(raw.to_string()))
        }
    }

    /// Build a code from bytes already drawn from [`ALPHABET`]
    pub(crate) fn from_alphabet(bytes: Vec<u8>) -> Self {
        Self(bytes.into_iter().map(char::from).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Check whether a first path segment is reserved for non-link routes
    pub fn is_reserved(segment: &str) -> bool {
        RESERVED_PATHS.contains(&segment)
    }

    /// Public URL that resolves to this code
    pub fn short_url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortCode {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<ShortCode> for String {
    fn from(code: ShortCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
