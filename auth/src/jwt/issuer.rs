use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;

use super::claims::Claims;
use super::errors::JwtError;
use super::handler::JwtHandler;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// Issues and validates subject-bearing access tokens.
///
/// A token is valid while its signature verifies and the clock reads strictly
/// before its `exp` claim. There is no revocation: validity is a function of
/// the signature and the clock only.
pub struct TokenIssuer {
    handler: JwtHandler,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

    /// Create an issuer signing with `secret` and issuing tokens valid for `lifetime`.
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            lifetime,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Configured token lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject` carrying `extra_claims`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        subject: &str,
        extra_claims: HashMap<String, serde_json::Value>,
    ) -> Result<String, JwtError> {
        let mut claims = Claims::for_subject(subject, self.clock.now(), self.lifetime);
        claims.extra.extend(extra_claims);

        self.handler.encode(&claims)
    }

    /// Verify the signature and expiry of `token` and return its claims.
    ///
    /// # Errors
    /// * `InvalidSignature` / `DecodingFailed` - Token is malformed
    /// * `MissingClaim` - Token carries no `sub` or `exp`
    /// * `TokenExpired` - Clock is at or past `exp`
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let claims: Claims = self.handler.decode(token)?;

        if claims.sub.is_none() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }
        if claims.exp.is_none() {
            return Err(JwtError::MissingClaim("exp".to_string()));
        }
        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    /// Read the subject of a valid token.
    ///
    /// # Errors
    /// Same as [`TokenIssuer::decode`].
    pub fn extract_subject(&self, token: &str) -> Result<String, JwtError> {
        self.decode(token)?
            .sub
            .ok_or_else(|| JwtError::MissingClaim("sub".to_string()))
    }

    /// Whether `token` is currently valid for `expected_subject`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.sub.as_deref() == Some(expected_subject),
            Err(_) => false,
        }
    }
}
