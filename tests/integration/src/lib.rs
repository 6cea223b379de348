//! Integration test utilities for the link service
//!
//! This crate provides helpers for running end-to-end tests against the
//! REST API, the redirect endpoint and the documentation surface.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
