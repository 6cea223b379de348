//! Link lifecycle service
//!
//! Owns code allocation, expiration, status changes, visit recording and
//! the QR image cache.

use link_core::{
    compute_expiration, DomainError, ExpirationRequest, LinkStatus, LinkSummary, NewLink,
    NewVisit, QrImage, QrMetadata, QrSize, ShortCode, ShortLink, UserId,
};
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Shortest destination accepted after normalization
const MIN_DESTINATION_LENGTH: usize = 10;

/// Prefix `https://` when no scheme is present, then sanity-check length
fn normalize_destination(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::ValidationError("url cannot be empty".to_string()));
    }

    let destination = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if destination.len() < MIN_DESTINATION_LENGTH {
        return Err(DomainError::InvalidDestination(destination));
    }

    Ok(destination)
}

/// A freshly issued QR access token
#[derive(Debug, Clone)]
pub struct QrToken {
    pub token: String,
    pub expires_in: i64,
}

/// Link lifecycle service
pub struct LinkService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LinkService<'a> {
    /// Create a new LinkService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Shorten `destination` for `owner_id`.
    ///
    /// Codes are drawn from the code generator and inserted until one is
    /// unique, up to the configured attempt bound. Only a uniqueness
    /// violation is retried.
    #[instrument(skip(self, destination, expiration), fields(owner_id = %owner_id))]
    pub async fn create_link(
        &self,
        destination: &str,
        owner_id: UserId,
        expiration: &ExpirationRequest,
    ) -> ServiceResult<ShortLink> {
        if expiration.preset.is_some() && expiration.custom.is_some() {
            return Err(DomainError::ConflictingExpiration.into());
        }

        let destination = normalize_destination(destination)?;
        let created_at = self.ctx.now();
        let expires_at = compute_expiration(expiration, created_at)?;
        let attempts = self.ctx.max_code_attempts();

        for attempt in 1..=attempts {
            let new_link = NewLink {
                code: self.ctx.code_generator().generate(),
                destination: destination.clone(),
                owner_id,
                created_at,
                expires_at: Some(expires_at),
            };

            match self.ctx.link_repo().insert(&new_link).await {
                Ok(link) => {
                    info!(code = %link.code, link_id = link.id, "Short link created");
                    return Ok(link);
                }
                Err(DomainError::ShortCodeTaken) => {
                    warn!(code = %new_link.code, attempt, "Short code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(attempts, "Short code space exhausted");
        Err(DomainError::CodeSpaceExhausted { attempts }.into())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Look up a link by code
    pub async fn get_link(&self, code: &ShortCode) -> ServiceResult<ShortLink> {
        self.ctx
            .link_repo()
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::LinkNotFound(code.to_string()).into())
    }

    /// Look up a link the caller owns
    #[instrument(skip(self), fields(code = %code, owner_id = %owner_id))]
    pub async fn get_owned_link(&self, code: &ShortCode, owner_id: UserId) -> ServiceResult<ShortLink> {
        self.find_owned(code, owner_id).await
    }

    /// All links owned by `owner_id`, newest first
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list_links(&self, owner_id: UserId) -> ServiceResult<Vec<LinkSummary>> {
        Ok(self.ctx.link_repo().find_by_owner(owner_id).await?)
    }

    /// Visit statistics for one owned link
    #[instrument(skip(self), fields(code = %code, owner_id = %owner_id))]
    pub async fn get_stats(&self, code: &ShortCode, owner_id: UserId) -> ServiceResult<LinkSummary> {
        let link = self.find_owned(code, owner_id).await?;
        let stats = self.ctx.link_repo().visit_stats(link.id).await?;

        Ok(LinkSummary { link, stats })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Change destination and/or expiration.
    ///
    /// `expiration` is `None` when the caller is not changing it; an empty
    /// request resets it to the default lifetime. An expired link must get a
    /// new expiration before its destination may change.
    #[instrument(skip(self, destination, expiration), fields(code = %code, owner_id = %owner_id))]
    pub async fn update_link(
        &self,
        code: &ShortCode,
        owner_id: UserId,
        destination: Option<&str>,
        expiration: Option<&ExpirationRequest>,
    ) -> ServiceResult<ShortLink> {
        let mut link = self.find_owned(code, owner_id).await?;

        let destination = destination.map(str::trim).filter(|d| !d.is_empty());
        if destination.is_none() && expiration.is_none() {
            return Err(DomainError::EmptyUpdate.into());
        }
        if expiration.is_some_and(|e| e.preset.is_some() && e.custom.is_some()) {
            return Err(DomainError::ConflictingExpiration.into());
        }

        let now = self.ctx.now();
        if link.is_expired_at(now) && expiration.is_none() {
            return Err(DomainError::ExpiredLinkUpdate.into());
        }

        if let Some(destination) = destination {
            link.destination = normalize_destination(destination)?;
        }
        if let Some(expiration) = expiration {
            link.expires_at = Some(compute_expiration(expiration, now)?);
        }
        link.updated_at = now;

        self.ctx.link_repo().update(&link).await?;
        info!("Short link updated");

        Ok(link)
    }

    /// Pause or resume a link
    #[instrument(skip(self), fields(code = %code, owner_id = %owner_id))]
    pub async fn update_status(
        &self,
        code: &ShortCode,
        owner_id: UserId,
        status: &str,
    ) -> ServiceResult<ShortLink> {
        let status: LinkStatus = status.parse()?;
        let mut link = self.find_owned(code, owner_id).await?;

        link.status = status;
        link.updated_at = self.ctx.now();
        self.ctx.link_repo().update(&link).await?;

        info!(status = %status, "Short link status changed");
        Ok(link)
    }

    /// Delete an owned link and its visits
    #[instrument(skip(self), fields(code = %code, owner_id = %owner_id))]
    pub async fn delete_link(&self, code: &ShortCode, owner_id: UserId) -> ServiceResult<()> {
        let link = self.find_owned(code, owner_id).await?;
        self.ctx.link_repo().delete(link.id).await?;

        info!("Short link deleted");
        Ok(())
    }

    // =========================================================================
    // Redirect
    // =========================================================================

    /// Resolve a public path segment to a link that may be redirected to
    pub async fn resolve_for_redirect(&self, raw_code: &str) -> ServiceResult<ShortLink> {
        let code = ShortCode::parse(raw_code)
            .map_err(|_| DomainError::LinkNotFound(raw_code.to_string()))?;
        let link = self.get_link(&code).await?;

        if !link.status.is_active() {
            return Err(DomainError::LinkPaused.into());
        }
        if link.is_expired_at(self.ctx.now()) {
            return Err(DomainError::LinkExpired.into());
        }

        Ok(link)
    }

    /// Record one visit and bump the click counter atomically
    #[instrument(skip(self, ip_address, user_agent))]
    pub async fn record_visit(
        &self,
        link_id: i64,
        ip_address: &str,
        user_agent: &str,
    ) -> ServiceResult<()> {
        let visit = NewVisit {
            link_id,
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
            created_at: self.ctx.now(),
        };

        self.ctx.link_repo().record_visit_and_increment(&visit).await?;
        debug!("Visit recorded");
        Ok(())
    }

    // =========================================================================
    // QR codes
    // =========================================================================

    /// Cached QR image, rendered at the default size on first request
    #[instrument(skip(self), fields(code = %code, owner_id = %owner_id))]
    pub async fn get_or_generate_qr(
        &self,
        code: &ShortCode,
        owner_id: UserId,
    ) -> ServiceResult<QrImage> {
        let link = self.find_owned(code, owner_id).await?;

        if let Some(image) = self.ctx.link_repo().find_qr_image(link.id).await? {
            return Ok(image);
        }

        self.render_and_store(&link, QrSize::default()).await
    }

    /// Always re-render at `size` and overwrite the cache
    #[instrument(skip(self), fields(code = %code, owner_id = %owner_id))]
    pub async fn regenerate_qr(
        &self,
        code: &ShortCode,
        owner_id: UserId,
        size: u32,
    ) -> ServiceResult<(ShortLink, QrImage)> {
        let link = self.find_owned(code, owner_id).await?;
        let size = QrSize::try_from(size)?;
        let image = self.render_and_store(&link, size).await?;

        Ok((link, image))
    }

    /// Issue a short-lived token that grants QR access to one owned link
    #[instrument(skip(self, email), fields(code = %code, owner_id = %owner_id))]
    pub async fn issue_qr_token(
        &self,
        code: &ShortCode,
        owner_id: UserId,
        email: &str,
    ) -> ServiceResult<QrToken> {
        let link = self.find_owned(code, owner_id).await?;
        let codec = self.ctx.token_codec();
        let token = codec.issue_scoped(owner_id, email, &link.code)?;

        Ok(QrToken {
            token,
            expires_in: codec.scoped_ttl_secs(),
        })
    }

    async fn render_and_store(&self, link: &ShortLink, size: QrSize) -> ServiceResult<QrImage> {
        let renderer = self.ctx.qr_renderer();
        let payload = link.code.short_url(self.ctx.short_url_base());
        let bytes = renderer.render(&payload, size)?;

        let image = QrImage {
            bytes,
            metadata: QrMetadata {
                size: size.pixels(),
                format: renderer.format().to_string(),
                generated_at: self.ctx.now(),
            },
        };
        self.ctx.link_repo().save_qr(link.id, &image).await?;

        info!(code = %link.code, size = %size, "QR code generated");
        Ok(image)
    }

    /// Load a link and check that `owner_id` owns it
    async fn find_owned(&self, code: &ShortCode, owner_id: UserId) -> ServiceResult<ShortLink> {
        let link = self.get_link(code).await?;

        if !link.is_owned_by(owner_id) {
            return Err(DomainError::NotLinkOwner.into());
        }

        Ok(link)
    }
}
