//! Axum extractors for request handling
//!
//! Custom extractors for authentication, client details, path codes and
//! validated bodies.

mod auth;
mod client;
mod path;
mod validated;

pub use auth::{AuthUser, LinkAccess};
pub use client::{client_ip, ClientInfo};
pub use path::CodePath;
pub use validated::{OptionalValidatedJson, ValidatedJson};
