//! Adaptive, salted password hashing (bcrypt and argon2id).

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::{ConfigError, HasherConfig};

#[derive(Error, Debug)]
pub enum HashError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("argon2 failure: {0}")]
    Argon2(String),
}

/// Self-describing adaptive hashes. A fresh salt is drawn on every call,
/// so two bundles for the same password never compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveHashes {
    /// `$2b$<cost>$<salt+hash>`
    pub bcrypt: String,
    /// PHC string, `$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`
    pub argon2: String,
}

/// Stateless hasher holding only validated, read-only parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    bcrypt_cost: u32,
    params: Params,
}

impl PasswordHasher {
    /// Validates the configuration and builds a hasher.
    pub fn new(config: &HasherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| ConfigError::Argon2Params(e.to_string()))?;
        Ok(Self {
            bcrypt_cost: config.bcrypt_cost,
            params,
        })
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    /// Hashes the password with both algorithms.
    ///
    /// CPU and memory bound; callers on an async runtime should run it on a
    /// blocking worker.
    pub fn adaptive_hashes(&self, password: &SecretString) -> Result<AdaptiveHashes, HashError> {
        Ok(AdaptiveHashes {
            bcrypt: self.hash_bcrypt(password)?,
            argon2: self.hash_argon2(password)?,
        })
    }

    /// bcrypt only reads the first 72 bytes of the password.
    fn hash_bcrypt(&self, password: &SecretString) -> Result<String, HashError> {
        Ok(bcrypt::hash(password.expose_secret(), self.bcrypt_cost)?)
    }

    fn hash_argon2(&self, password: &SecretString) -> Result<String, HashError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map_err(|e| HashError::Argon2(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verifies a password against a bcrypt string.
    pub fn verify_bcrypt(password: &SecretString, hash: &str) -> Result<bool, HashError> {
        Ok(bcrypt::verify(password.expose_secret(), hash)?)
    }

    /// Verifies a password against an argon2 PHC string, using the
    /// parameters encoded in the string.
    pub fn verify_argon2(password: &SecretString, hash: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(hash).map_err(|e| HashError::Argon2(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheapest parameters the bounds allow, to keep the suite fast.
    fn fast_config() -> HasherConfig {
        HasherConfig {
            bcrypt_cost: 4,
            argon2_memory_kib: 64,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    fn secret(pwd: &str) -> SecretString {
        SecretString::new(pwd.into())
    }

    #[test]
    fn test_rejects_out_of_range_cost() {
        let config = HasherConfig {
            bcrypt_cost: 31,
            ..fast_config()
        };
        assert!(matches!(
            PasswordHasher::new(&config),
            Err(ConfigError::BcryptCostOutOfRange(31))
        ));
    }

    #[test]
    fn test_outputs_are_self_describing() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let hashes = hasher.adaptive_hashes(&secret("correct horse")).unwrap();
        assert!(hashes.bcrypt.starts_with("$2b$04$"));
        assert!(hashes.argon2.starts_with("$argon2id$v=19$m=64,t=1,p=1$"));
    }

    #[test]
    fn test_fresh_salt_each_call_but_both_verify() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let pwd = secret("MyS3cur3P@ssw0rd!2025");

        let first = hasher.adaptive_hashes(&pwd).unwrap();
        let second = hasher.adaptive_hashes(&pwd).unwrap();
        assert_ne!(first.bcrypt, second.bcrypt);
        assert_ne!(first.argon2, second.argon2);

        for hashes in [&first, &second] {
            assert!(PasswordHasher::verify_bcrypt(&pwd, &hashes.bcrypt).unwrap());
            assert!(PasswordHasher::verify_argon2(&pwd, &hashes.argon2).unwrap());
        }
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let hashes = hasher.adaptive_hashes(&secret("right")).unwrap();
        let wrong = secret("wrong");
        assert!(!PasswordHasher::verify_bcrypt(&wrong, &hashes.bcrypt).unwrap());
        assert!(!PasswordHasher::verify_argon2(&wrong, &hashes.argon2).unwrap());
    }

    #[test]
    fn test_empty_password() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let pwd = secret("");
        let hashes = hasher.adaptive_hashes(&pwd).unwrap();
        assert!(PasswordHasher::verify_bcrypt(&pwd, &hashes.bcrypt).unwrap());
        assert!(PasswordHasher::verify_argon2(&pwd, &hashes.argon2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let pwd = secret("anything");
        assert!(PasswordHasher::verify_bcrypt(&pwd, "not-a-hash").is_err());
        assert!(PasswordHasher::verify_argon2(&pwd, "not-a-hash").is_err());
    }
}
