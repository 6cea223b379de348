//! Entity <-> model mappers

mod link;
mod user;
