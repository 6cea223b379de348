//! User entity <-> model mapper

use link_core::{User, UserId};

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::new(model.id),
            email: model.email,
            provider: model.provider,
            first_name: model.first_name,
            last_name: model.last_name,
            email_verified: model.email_verified,
            is_active: model.is_active,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
