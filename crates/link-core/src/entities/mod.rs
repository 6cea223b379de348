//! Domain entities - core business objects

mod link;
mod stats;
mod user;
mod visit;

pub use link::{NewLink, ShortLink};
pub use stats::{LinkSummary, VisitStats};
pub use user::{User, PROVIDER_EMAIL};
pub use visit::{NewVisit, Visit};
