//! Bearer-token authentication.

mod credentials;
mod jwt;

use thiserror::Error;

pub use credentials::{CredentialStore, StaticCredentials};
pub use jwt::{jwt_auth, Claims, JwtConfig, TOKEN_TTL_SECS};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}
