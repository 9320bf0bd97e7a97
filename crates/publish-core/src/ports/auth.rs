//! Token verification port.

use crate::domain::Principal;

/// Issues and verifies bearer tokens carrying a [`Principal`].
pub trait TokenService: Send + Sync {
    /// Issue an access token for a principal.
    fn issue(&self, principal: &Principal) -> Result<String, AuthError>;

    /// Validate a token and recover the principal it was issued for.
    fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
