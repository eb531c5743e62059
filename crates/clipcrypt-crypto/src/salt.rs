//! Salt digesting
//!
//! The dataspace identifier used as salt is an arbitrary-length public
//! string. SHA-256 maps it to the fixed 32 bytes fed to Argon2id. This is a
//! length normaliser only: it is not a key-derivation step and the digest is
//! exactly as public as the salt it came from.

use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};

/// SHA-256 of a salt string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashedSalt([u8; 32]);

impl HashedSalt {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Digest a salt string. Total: the empty string has a digest too.
pub fn digest_salt(salt: &str) -> HashedSalt {
    HashedSalt(Sha256::digest(salt.as_bytes()).into())
}

/// The salt argument of a derivation: either the raw dataspace string or a
/// digest computed earlier (the ratchet digests once and reuses it).
#[derive(Debug, Clone, Copy)]
pub enum SaltSource<'a> {
    Raw(&'a str),
    Hashed(&'a HashedSalt),
}

impl<'a> SaltSource<'a> {
    /// Build a salt argument from two optional inputs.
    ///
    /// When both are present the precomputed digest wins; the raw string is
    /// then ignored rather than re-digested.
    pub fn from_parts(
        salt: Option<&'a str>,
        hashed: Option<&'a HashedSalt>,
    ) -> CryptoResult<Self> {
        match (salt, hashed) {
            (_, Some(hashed)) => Ok(Self::Hashed(hashed)),
            (Some(salt), None) => Ok(Self::Raw(salt)),
            (None, None) => Err(CryptoError::MissingSalt),
        }
    }

    /// The 32 bytes handed to the password hash.
    pub fn resolve(self) -> HashedSalt {
        match self {
            Self::Raw(salt) => digest_salt(salt),
            Self::Hashed(hashed) => *hashed,
        }
    }
}

impl<'a> From<&'a str> for SaltSource<'a> {
    fn from(salt: &'a str) -> Self {
        Self::Raw(salt)
    }
}

impl<'a> From<&'a HashedSalt> for SaltSource<'a> {
    fn from(hashed: &'a HashedSalt) -> Self {
        Self::Hashed(hashed)
    }
}
