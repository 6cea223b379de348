//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{LinkSummary, NewLink, NewVisit, ShortLink, User, VisitStats};
use crate::error::DomainError;
use crate::value_objects::{QrImage, ShortCode, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Link Repository
// ============================================================================

#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Insert a new link.
    ///
    /// Fails with [`DomainError::ShortCodeTaken`] when the code is already in
    /// use; any other failure is returned unchanged.
    async fn insert(&self, link: &NewLink) -> RepoResult<ShortLink>;

    /// Find link by code
    async fn find_by_code(&self, code: &ShortCode) -> RepoResult<Option<ShortLink>>;

    /// List an owner's links, newest first, with visit aggregates
    async fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<LinkSummary>>;

    /// Visit aggregates for one link
    async fn visit_stats(&self, link_id: i64) -> RepoResult<VisitStats>;

    /// Persist destination, status, expiry and `updated_at`
    async fn update(&self, link: &ShortLink) -> RepoResult<()>;

    /// Load the cached QR image, if any
    async fn find_qr_image(&self, link_id: i64) -> RepoResult<Option<QrImage>>;

    /// Overwrite the cached QR image
    async fn save_qr(&self, link_id: i64, image: &QrImage) -> RepoResult<()>;

    /// Delete a link and its visits
    async fn delete(&self, link_id: i64) -> RepoResult<()>;

    /// Insert a visit row and increment the link's click counter as one
    /// atomic unit. Either both happen or neither does.
    async fn record_visit_and_increment(&self, visit: &NewVisit) -> RepoResult<()>;

    /// Check that the store is reachable
    async fn ping(&self) -> RepoResult<()>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user; fails with [`DomainError::EmailAlreadyExists`]
    async fn create(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// Record a successful login
    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> RepoResult<()>;
}
