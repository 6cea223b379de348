//! Database models with SQLx `FromRow` derives

mod link;
mod user;

pub use link::{LinkModel, LinkSummaryRow, QrImageRow, VisitStatsRow};
pub use user::UserModel;
