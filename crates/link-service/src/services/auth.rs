//! Authentication service
//!
//! Handles registration, login, token refresh and the current-user lookup.

use link_common::AppError;
use link_core::{DomainError, User, UserId};
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, CurrentUserResponse, LoginRequest, RegisterRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Emails are compared case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new email/password account
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        let email = normalize_email(&request.email);

        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        // Validates strength before hashing
        let password_hash = self.ctx.passwords().hash_new(&request.password)?;

        let user = User::new(
            UserId::generate(),
            email,
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            self.ctx.now(),
        );
        self.ctx
            .user_repo()
            .create(&user, Some(&password_hash))
            .await?;

        info!(user_id = %user.id, "User registered successfully");

        self.issue_for(&user)
    }

    /// Login with email and password
    ///
    /// Unknown email, inactive account and wrong password all fail with the
    /// same `InvalidCredentials` error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let email = normalize_email(&request.email);

        let mut user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !user.is_active {
            warn!(user_id = %user.id, "Login failed: account inactive");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if let Err(e) = self
            .ctx
            .passwords()
            .verify_or_error(&request.password, &password_hash)
        {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(e.into());
        }

        let now = self.ctx.now();
        self.ctx.user_repo().touch_last_login(user.id, now).await?;
        user.last_login = Some(now);
        user.updated_at = now;

        info!(user_id = %user.id, "User logged in successfully");

        self.issue_for(&user)
    }

    /// Exchange a valid identity token for a fresh one
    #[instrument(skip(self, token))]
    pub async fn refresh(&self, token: &str) -> ServiceResult<AuthResponse> {
        let codec = self.ctx.token_codec();
        let user_id = codec.verify(token)?.user_id()?;

        let user = self
            .active_user(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        let token = codec.refresh(token)?;
        info!(user_id = %user.id, "Token refreshed");

        Ok(AuthResponse::new(
            token,
            codec.ttl().num_seconds(),
            CurrentUserResponse::from(&user),
        ))
    }

    /// Profile of the authenticated user
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn me(&self, user_id: UserId) -> ServiceResult<CurrentUserResponse> {
        self.active_user(user_id)
            .await?
            .map(CurrentUserResponse::from)
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    async fn active_user(&self, user_id: UserId) -> ServiceResult<Option<User>> {
        let user = self.ctx.user_repo().find_by_id(user_id).await?;
        Ok(user.filter(|u| u.is_active))
    }

    fn issue_for(&self, user: &User) -> ServiceResult<AuthResponse> {
        let codec = self.ctx.token_codec();
        let token = codec.issue_identity(user.id, &user.email, &user.provider)?;

        Ok(AuthResponse::new(
            token,
            codec.ttl().num_seconds(),
            CurrentUserResponse::from(user),
        ))
    }
}
