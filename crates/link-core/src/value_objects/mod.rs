//! Value objects - immutable, validated domain primitives

mod expiration;
mod link_status;
mod qr;
mod short_code;
mod user_id;

pub use expiration::{
    compute_expiration, CustomExpiration, ExpirationPreset, ExpirationRequest, MAX_EXPIRATION_DAYS,
};
pub use link_status::LinkStatus;
pub use qr::{QrImage, QrMetadata, QrSize, QR_FORMAT_PNG};
pub use short_code::{ShortCode, ALPHABET, MAX_SHORT_CODE_LENGTH, RESERVED_PATHS, SHORT_CODE_LENGTH};
pub use user_id::{UserId, UserIdParseError};
