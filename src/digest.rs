//! Fast, unsalted digests.
//!
//! MD5 and SHA-256 are fixed-cost and unsalted: they are here for display
//! and integrity-check purposes and must never be used to store passwords.

use md5::Md5;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Lowercase hex digests of the UTF-8 password bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastDigests {
    pub md5: String,
    pub sha256: String,
}

/// Computes the MD5 and SHA-256 digests of a password. Deterministic.
pub fn fast_digests(password: &SecretString) -> FastDigests {
    let bytes = password.expose_secret().as_bytes();
    FastDigests {
        md5: hex::encode(Md5::digest(bytes)),
        sha256: hex::encode(Sha256::digest(bytes)),
    }
}

/// SHA-1 of the password as 40 uppercase hex characters, the form the
/// breach range API indexes by.
pub(crate) fn sha1_upper_hex(password: &SecretString) -> String {
    hex::encode_upper(Sha1::digest(password.expose_secret().as_bytes()))
}
