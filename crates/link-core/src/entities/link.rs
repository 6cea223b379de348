//! Short link entity

use chrono::{DateTime, Utc};

use crate::value_objects::{LinkStatus, QrMetadata, ShortCode, UserId};

/// A shortened URL owned by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: i64,
    pub code: ShortCode,
    pub destination: String,
    pub owner_id: UserId,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub qr: Option<QrMetadata>,
}

impl ShortLink {
    /// Check if the link has expired at `now` (expiry instant counts as expired)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Check whether a redirect should be served at `now`
    pub fn is_resolvable_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && !self.is_expired_at(now)
    }

    /// A QR image is cached for this link
    pub fn has_qr(&self) -> bool {
        self.qr.as_ref().is_some_and(|qr| qr.size > 0)
    }
}

/// A link ready to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: ShortCode,
    pub destination: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewLink {
    /// Materialize the stored link under `id`
    pub fn into_link(self, id: i64) -> ShortLink {
        ShortLink {
            id,
            code: self.code,
            destination: self.destination,
            owner_id: self.owner_id,
            status: LinkStatus::Active,
            created_at: self.created_at,
            updated_at: self.created_at,
            expires_at: self.expires_at,
            click_count: 0,
            qr: None,
        }
    }
}
