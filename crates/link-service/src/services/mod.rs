//! Business logic services
//!
//! This module contains the service layer: the link lifecycle, account
//! authentication, and the dependency container they share.

pub mod auth;
pub mod context;
pub mod error;
pub mod link;

#[cfg(test)]
mod test_support;

pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use link::{LinkService, QrToken};
