//! # link-db
//!
//! Persistence layer implementing the `link-core` repository ports.
//!
//! - PostgreSQL via SQLx (runtime-checked queries, no compile-time macros)
//! - Database models with `FromRow` derives and entity mappers
//! - Idempotent schema bootstrap
//! - In-memory repositories for development and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use link_db::{create_pool, run_migrations, DatabaseConfig, PgLinkRepository};
//!
//! async fn example() -> Result<(), sqlx::Error> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     let links = PgLinkRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use memory::{InMemoryLinkRepository, InMemoryUserRepository};
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{PgLinkRepository, PgUserRepository};
pub use schema::run_migrations;
