use thiserror::Error;

/// Error type for JWT operations.
///
/// `DecodingFailed`, `InvalidSignature` and `MissingClaim` all describe a
/// malformed token; `TokenExpired` is reported separately.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}

impl JwtError {
    /// Whether the token could not be trusted at all (as opposed to merely expired).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            JwtError::DecodingFailed(_) | JwtError::InvalidSignature | JwtError::MissingClaim(_)
        )
    }
}
