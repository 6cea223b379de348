//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use link_core::ShortCode;

use crate::response::ApiError;

/// A validated `{code}` path segment
#[derive(Debug, Clone)]
pub struct CodePath(pub ShortCode);

#[async_trait]
impl<S> FromRequestParts<S> for CodePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        Ok(CodePath(ShortCode::parse(&raw)?))
    }
}
