use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Produces Argon2id hashes in PHC string format. The work factor is the
/// base-2 logarithm of the memory cost in KiB, so the default cost of 12
/// derives 2^12 memory blocks per pass.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub const DEFAULT_COST: u32 = 12;
    pub const MIN_COST: u32 = 3;
    pub const MAX_COST: u32 = 22;

    /// Create a hasher with the default work factor.
    pub fn new() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
        }
    }

    /// Create a hasher with an explicit work factor.
    ///
    /// # Arguments
    /// * `cost` - Base-2 logarithm of the Argon2 memory cost (KiB)
    ///
    /// # Errors
    /// * `InvalidCost` - Cost is outside the supported range
    pub fn with_cost(cost: u32) -> Result<Self, PasswordError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost {
                cost,
                min: Self::MIN_COST,
                max: Self::MAX_COST,
            });
        }
        Ok(Self { cost })
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password securely.
    ///
    /// Every call generates a fresh random salt, so hashing the same input
    /// twice yields two different strings.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `MissingPassword` - Plaintext is empty
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::MissingPassword);
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// The salt and parameters are read from the hash string, so hashes
    /// produced under a different cost still verify. A malformed hash never
    /// matches.
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `MissingPassword` - Plaintext is empty
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::MissingPassword);
        }

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return Ok(false);
            }
        };

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(
            1 << self.cost,
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
