//! Password hashing using Argon2id
//!
//! Stored hashes use the PHC string format, so verification reads its
//! parameters from the hash itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_service::auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new(&PasswordConfig::default())?;
//! let hash = hasher.hash("my_secure_password")?;
//!
//! assert!(hasher.verify("my_secure_password", &hash)?);
//! assert!(!hasher.verify("wrong_password", &hash)?);
//! ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordConfig;
use crate::error::Error;

/// Password hasher using Argon2id
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl PasswordHasher {
    /// Create a hasher with the given cost parameters
    ///
    /// Fails when the parameters are outside what Argon2 accepts.
    pub fn new(config: &PasswordConfig) -> Result<Self, Error> {
        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            None,
        )
        .map_err(|e| Error::Auth(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Auth(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a PHC hash in constant time
    ///
    /// A mismatch is `Ok(false)`; a malformed hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::Auth(format!("Invalid password hash format: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Auth(format!("Password verification failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher.verify("test_password_123", &hash).unwrap());
        assert!(!hasher.verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_default_params_are_valid() {
        assert!(PasswordHasher::new(&PasswordConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let config = PasswordConfig {
            memory_cost_kib: 1,
            time_cost: 0,
            parallelism: 0,
        };
        assert!(matches!(PasswordHasher::new(&config), Err(Error::Auth(_))));
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(cheap_hasher().verify("password", "not_a_valid_hash").is_err());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = cheap_hasher();
        let hash1 = hasher.hash("secret").unwrap();
        let hash2 = hasher.hash("secret").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("secret", &hash1).unwrap());
        assert!(hasher.verify("secret", &hash2).unwrap());
    }
}
