//! User entity - an account that owns short links

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// Provider tag for password-based accounts
pub const PROVIDER_EMAIL: &str = "email";

/// User account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub provider: String,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new email/password account
    pub fn new(
        id: UserId,
        email: String,
        first_name: String,
        last_name: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            provider: PROVIDER_EMAIL.to_string(),
            first_name,
            last_name,
            email_verified: false,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// "First Last", trimmed when either part is empty
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
