//! # link-api
//!
//! REST API server built with Axum framework: link management, QR codes,
//! the public redirect and the gated documentation surface.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, create_memory_app_state, run, serve};
pub use state::AppState;
