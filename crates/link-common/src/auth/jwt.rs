//! Token signing and verification
//!
//! Identity tokens and QR-scoped tokens are HS256 JWTs. The verifier pins the
//! algorithm and checks `exp`/`nbf` against the injected [`Clock`] with zero
//! leeway.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use link_core::{Clock, ShortCode, UserId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// `token_type` carried by QR-scoped tokens
pub const TOKEN_TYPE_QR: &str = "qr";

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token verification and signing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token configuration error: {0}")]
    Config(String),

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    Signature,

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Token not valid for this purpose")]
    WrongPurpose,
}

/// Identity token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub user_id: String,
    pub email: String,
    pub provider: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    /// Only present on purpose-scoped tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Claims {
    /// Parse the subject as the canonical user id
    ///
    /// # Errors
    /// Returns [`TokenError::Malformed`] if the subject is not a valid id
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        UserId::parse(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

/// Claims of a short-lived token that grants access to one link's QR image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedClaims {
    pub sub: String,
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub short_code: String,
    #[serde(default)]
    pub token_type: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
}

impl ScopedClaims {
    /// # Errors
    /// Returns [`TokenError::Malformed`] if the subject is not a valid id
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        UserId::parse(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

trait TimeBounded {
    fn not_before(&self) -> i64;
    fn expires_at(&self) -> i64;
}

impl TimeBounded for Claims {
    fn not_before(&self) -> i64 {
        self.nbf
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl TimeBounded for ScopedClaims {
    fn not_before(&self) -> i64 {
        self.nbf
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Signs and verifies identity and scoped tokens
#[derive(Clone)]
pub struct TokenCodec {
    keys: Option<(EncodingKey, DecodingKey)>,
    issuer: String,
    ttl: Duration,
    scoped_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec. An empty secret yields a codec that refuses to sign
    /// or verify anything.
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        ttl: Duration,
        scoped_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let keys = (!secret.is_empty()).then(|| {
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        });

        Self {
            keys,
            issuer: issuer.into(),
            ttl,
            scoped_ttl,
            clock,
        }
    }

    pub fn from_config(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            &config.secret,
            config.issuer.clone(),
            Duration::hours(config.expiry_hours),
            Duration::minutes(config.qr_token_expiry_minutes),
            clock,
        )
    }

    /// Lifetime of identity tokens issued by [`Self::issue_identity`]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // =========================================================================
    // Identity tokens
    // =========================================================================

    /// Issue an identity token valid for `ttl`
    pub fn issue(
        &self,
        user_id: UserId,
        email: &str,
        provider: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = self.clock.now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            user_id: user_id.to_string(),
            email: email.to_string(),
            provider: provider.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl.num_seconds(),
            iss: self.issuer.clone(),
            token_type: None,
        };

        self.sign(&claims)
    }

    /// Issue an identity token with the configured lifetime
    pub fn issue_identity(
        &self,
        user_id: UserId,
        email: &str,
        provider: &str,
    ) -> Result<String, TokenError> {
        self.issue(user_id, email, provider, self.ttl)
    }

    /// Verify an identity token.
    ///
    /// Purpose-scoped tokens are rejected with [`TokenError::WrongPurpose`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims: Claims = self.decode(token)?;

        if claims.token_type.is_some() {
            return Err(TokenError::WrongPurpose);
        }

        Ok(claims)
    }

    /// Verify `token` and issue a fresh one for the same subject
    pub fn refresh(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.verify(token)?;
        let user_id = claims.user_id()?;

        self.issue_identity(user_id, &claims.email, &claims.provider)
    }

    // =========================================================================
    // Scoped tokens
    // =========================================================================

    /// Issue a short-lived token granting QR access to one link
    pub fn issue_scoped(
        &self,
        user_id: UserId,
        email: &str,
        code: &ShortCode,
    ) -> Result<String, TokenError> {
        let now = self.clock.now().timestamp();
        let claims = ScopedClaims {
            sub: user_id.to_string(),
            user_id: user_id.to_string(),
            email: email.to_string(),
            short_code: code.to_string(),
            token_type: TOKEN_TYPE_QR.to_string(),
            iat: now,
            nbf: now,
            exp: now + self.scoped_ttl.num_seconds(),
            iss: self.issuer.clone(),
        };

        self.sign(&claims)
    }

    /// Verify a scoped token and check that it was issued for `code`
    pub fn verify_scoped(&self, token: &str, code: &ShortCode) -> Result<ScopedClaims, TokenError> {
        let claims: ScopedClaims = self.decode(token)?;

        if claims.token_type != TOKEN_TYPE_QR || claims.short_code != code.as_str() {
            return Err(TokenError::WrongPurpose);
        }

        Ok(claims)
    }

    /// Lifetime of scoped tokens in seconds
    pub fn scoped_ttl_secs(&self) -> i64 {
        self.scoped_ttl.num_seconds()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn keys(&self) -> Result<&(EncodingKey, DecodingKey), TokenError> {
        self.keys
            .as_ref()
            .ok_or_else(|| TokenError::Config("JWT secret is not configured".to_string()))
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let (encoding_key, _) = self.keys()?;

        encode(&Header::new(ALGORITHM), claims, encoding_key)
            .map_err(|e| TokenError::Config(format!("failed to sign token: {e}")))
    }

    fn decode<T>(&self, token: &str) -> Result<T, TokenError>
    where
        T: DeserializeOwned + TimeBounded,
    {
        let (_, decoding_key) = self.keys()?;

        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Signature);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "sub", "iss"]);

        let data = decode::<T>(token, decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => TokenError::Signature,
            _ => TokenError::Malformed,
        })?;

        let now = self.clock.now().timestamp();
        if now > data.claims.expires_at() {
            return Err(TokenError::Expired);
        }
        if now < data.claims.not_before() {
            return Err(TokenError::NotYetValid);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("scoped_ttl", &self.scoped_ttl)
            .field("configured", &self.keys.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use link_core::ManualClock;

    const SECRET: &str = "test-secret-key-that-is-long-enough";
    const ISSUER: &str = "url-shortener-backend";

    fn create_test_codec() -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = TokenCodec::new(
            SECRET,
            ISSUER,
            Duration::hours(24),
            Duration::minutes(5),
            clock.clone(),
        );
        (codec, clock)
    }

    fn code(raw: &str) -> ShortCode {
        ShortCode::parse(raw).unwrap()
    }

    fn flip_signature_char(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{head}.{}", chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_and_verify() {
        let (codec, _) = create_test_codec();
        let user_id = UserId::generate();

        let token = codec.issue_identity(user_id, "ada@example.com", "email").unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.provider, "email");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(claims.token_type.is_none());
    }

    #[test]
    fn test_expired_token_is_distinguishable() {
        let (codec, clock) = create_test_codec();
        let token = codec
            .issue(UserId::generate(), "a@b.co", "email", Duration::minutes(1))
            .unwrap();

        clock.advance(Duration::seconds(60));
        assert!(codec.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_not_yet_valid() {
        let (codec, clock) = create_test_codec();
        let token = codec.issue_identity(UserId::generate(), "a@b.co", "email").unwrap();

        clock.advance(Duration::seconds(-10));
        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::NotYetValid);
    }

    #[test]
    fn test_tampered_signature() {
        let (codec, _) = create_test_codec();
        let token = codec.issue_identity(UserId::generate(), "a@b.co", "email").unwrap();

        let tampered = flip_signature_char(&token);
        assert_eq!(codec.verify(&tampered).unwrap_err(), TokenError::Signature);
    }

    #[test]
    fn test_wrong_secret() {
        let (codec, clock) = create_test_codec();
        let other = TokenCodec::new("another-secret", ISSUER, Duration::hours(1), Duration::minutes(5), clock);
        let token = other.issue_identity(UserId::generate(), "a@b.co", "email").unwrap();

        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Signature);
    }

    #[test]
    fn test_algorithm_substitution_rejected() {
        let (codec, clock) = create_test_codec();
        let now = clock.now().timestamp();
        let claims = Claims {
            sub: UserId::generate().to_string(),
            user_id: String::new(),
            email: "a@b.co".into(),
            provider: "email".into(),
            iat: now,
            nbf: now,
            exp: now + 60,
            iss: ISSUER.into(),
            token_type: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Signature);
    }

    #[test]
    fn test_malformed_token() {
        let (codec, _) = create_test_codec();
        assert_eq!(codec.verify("invalid.token.here").unwrap_err(), TokenError::Malformed);
        assert_eq!(codec.verify("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_missing_secret() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = TokenCodec::new("", ISSUER, Duration::hours(1), Duration::minutes(5), clock);

        let err = codec
            .issue_identity(UserId::generate(), "a@b.co", "email")
            .unwrap_err();
        assert!(matches!(err, TokenError::Config(_)));
    }

    #[test]
    fn test_wrong_issuer() {
        let (codec, clock) = create_test_codec();
        let other = TokenCodec::new(SECRET, "someone-else", Duration::hours(1), Duration::minutes(5), clock);
        let token = other.issue_identity(UserId::generate(), "a@b.co", "email").unwrap();

        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_refresh_supersedes() {
        let (codec, clock) = create_test_codec();
        let user_id = UserId::generate();
        let token = codec.issue_identity(user_id, "a@b.co", "email").unwrap();

        clock.advance(Duration::seconds(30));
        let refreshed = codec.refresh(&token).unwrap();
        assert_ne!(refreshed, token);

        let claims = codec.verify(&refreshed).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.iat, clock.now().timestamp());
    }

    #[test]
    fn test_scoped_token_roundtrip() {
        let (codec, _) = create_test_codec();
        let user_id = UserId::generate();
        let token = codec.issue_scoped(user_id, "a@b.co", &code("abc123")).unwrap();

        let claims = codec.verify_scoped(&token, &code("abc123")).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.token_type, "qr");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_scoped_token_wrong_code() {
        let (codec, _) = create_test_codec();
        let token = codec
            .issue_scoped(UserId::generate(), "a@b.co", &code("abc123"))
            .unwrap();

        assert_eq!(
            codec.verify_scoped(&token, &code("xyz789")).unwrap_err(),
            TokenError::WrongPurpose
        );
    }

    #[test]
    fn test_slots_do_not_cross() {
        let (codec, _) = create_test_codec();
        let user_id = UserId::generate();
        let identity = codec.issue_identity(user_id, "a@b.co", "email").unwrap();
        let scoped = codec.issue_scoped(user_id, "a@b.co", &code("abc123")).unwrap();

        assert_eq!(
            codec.verify_scoped(&identity, &code("abc123")).unwrap_err(),
            TokenError::WrongPurpose
        );
        assert_eq!(codec.verify(&scoped).unwrap_err(), TokenError::WrongPurpose);
    }

    #[test]
    fn test_scoped_token_expires() {
        let (codec, clock) = create_test_codec();
        let token = codec
            .issue_scoped(UserId::generate(), "a@b.co", &code("abc123"))
            .unwrap();

        clock.advance(Duration::minutes(6));
        assert_eq!(
            codec.verify_scoped(&token, &code("abc123")).unwrap_err(),
            TokenError::Expired
        );
    }
}
