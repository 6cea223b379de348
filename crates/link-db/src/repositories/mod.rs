//! Repository implementations

mod error;
mod link;
mod user;

pub use link::PgLinkRepository;
pub use user::PgUserRepository;
