//! Ports the domain depends on

mod ports;
mod repositories;

pub use ports::{Clock, CodeGenerator, ManualClock, QrRenderer, SecureCodeGenerator, SystemClock};
pub use repositories::{LinkRepository, RepoResult, UserRepository};
