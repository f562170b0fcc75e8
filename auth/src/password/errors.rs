use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be provided")]
    MissingPassword,

    #[error("Unsupported hashing cost {cost}: expected {min}..={max}")]
    InvalidCost { cost: u32, min: u32, max: u32 },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
