//! Authentication extractors
//!
//! [`AuthUser`] reads the identity placed in request extensions by the
//! identity gateway. [`LinkAccess`] runs the non-aborting gate for routes
//! that also accept a scoped QR token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use link_common::AppError;
use link_core::{ShortCode, UserId};

use crate::extractors::CodePath;
use crate::middleware::{authenticate_optional, Access, Identity};
use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated user behind the identity gateway
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
    pub provider: String,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            email: identity.email,
            provider: identity.provider,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when the route sits behind the gateway
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Self::from)
            .ok_or(ApiError::App(AppError::MissingAuth))
    }
}

/// `{code}` path segment plus whatever credentials the caller presented
#[derive(Debug, Clone)]
pub struct LinkAccess {
    pub code: ShortCode,
    pub access: Access,
}

impl LinkAccess {
    /// Caller id, or 401 for anonymous access
    pub fn require_user(&self) -> Result<UserId, ApiError> {
        self.access
            .user_id()
            .ok_or(ApiError::App(AppError::MissingAuth))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for LinkAccess
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CodePath(code) = CodePath::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);
        let access = authenticate_optional(&parts.headers, &code, app_state.token_codec());

        Ok(Self { code, access })
    }
}
