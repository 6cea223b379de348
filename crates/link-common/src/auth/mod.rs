//! Authentication utilities

mod jwt;
mod password;

pub use jwt::{Claims, ScopedClaims, TokenCodec, TokenError, TOKEN_TYPE_QR};
pub use password::{
    hash_password, validate_password_strength, verify_password, PasswordService,
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
