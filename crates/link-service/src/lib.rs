//! # link-service
//!
//! Application layer containing the link lifecycle and account services,
//! plus the request/response DTOs used by the HTTP layer.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, LinkService, QrToken, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};
