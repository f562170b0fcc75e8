use std::collections::HashMap;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenIssuer;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and token handling.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher used for stored credentials
    /// * `token_issuer` - Issuer used for access tokens
    pub fn new(password_hasher: PasswordHasher, token_issuer: TokenIssuer) -> Self {
        Self {
            password_hasher,
            token_issuer,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - Plaintext is missing
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue an access token for `subject`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Token subject
    /// * `extra_claims` - Additional claims embedded in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        extra_claims: HashMap<String, serde_json::Value>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_issuer.issue(subject, extra_claims)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a token without password verification.
    ///
    /// Used right after registration, when the caller has just proven
    /// knowledge of the password by choosing it.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(
        &self,
        subject: &str,
        extra_claims: HashMap<String, serde_json::Value>,
    ) -> Result<String, JwtError> {
        self.token_issuer.issue(subject, extra_claims)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Token is malformed, expired or lacks a subject
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_issuer.decode(token)
    }

    /// Read the subject of a valid token.
    ///
    /// # Errors
    /// * `JwtError` - Token is malformed, expired or lacks a subject
    pub fn extract_subject(&self, token: &str) -> Result<String, JwtError> {
        self.token_issuer.extract_subject(token)
    }

    /// Whether `token` is currently valid for `expected_subject`.
    pub fn is_token_valid(&self, token: &str, expected_subject: &str) -> bool {
        self.token_issuer.validate(token, expected_subject)
    }
}
