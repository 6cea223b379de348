//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod auth;
pub mod docs;
pub mod health;
pub mod links;
pub mod qr;
pub mod redirect;
