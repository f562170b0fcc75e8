//! Authentication utilities library
//!
//! Provides the credential and token primitives behind the auth service:
//! - Password hashing (Argon2id with a configurable cost factor)
//! - Signed, time-limited access tokens (HS256 JWT)
//! - Authentication coordination
//!
//! Time-based checks go through the [`Clock`] trait so that expiry can be
//! exercised deterministically.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(4).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use std::collections::HashMap;
//!
//! use auth::TokenIssuer;
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//! let token = issuer.issue("alice", HashMap::new()).unwrap();
//! assert!(issuer.validate(&token, "alice"));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use std::collections::HashMap;
//!
//! use auth::{Authenticator, PasswordHasher, TokenIssuer};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     PasswordHasher::with_cost(4).unwrap(),
//!     TokenIssuer::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth.authenticate("password123", &hash, "alice", HashMap::new()).unwrap();
//!
//! // Validate token
//! assert_eq!(auth.extract_subject(&result.access_token).unwrap(), "alice");
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenIssuer;
pub use password::PasswordError;
pub use password::PasswordHasher;
