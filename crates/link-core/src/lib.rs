//! # link-core
//!
//! Domain layer for the link shortener: entities, value objects, ports, and the
//! expiration arithmetic. This crate has no dependencies on infrastructure
//! (database, web framework, token signing).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{LinkSummary, NewLink, NewVisit, ShortLink, User, Visit, VisitStats};
pub use error::DomainError;
pub use traits::{
    Clock, CodeGenerator, LinkRepository, ManualClock, QrRenderer, RepoResult, SecureCodeGenerator,
    SystemClock, UserRepository,
};
pub use value_objects::{
    compute_expiration, CustomExpiration, ExpirationPreset, ExpirationRequest, LinkStatus,
    QrImage, QrMetadata, QrSize, ShortCode, UserId, MAX_EXPIRATION_DAYS, QR_FORMAT_PNG,
};
