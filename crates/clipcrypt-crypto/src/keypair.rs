//! Deterministic Ed25519 identity from (keyphrase, salt)
//!
//! The private key is the 32-byte Ed25519 seed `strong(keyphrase, SHA-256(salt))`
//! and the public key follows from it by the standard RFC 8032 derivation.
//! Same inputs, same keypair: on every run, every device, every client.
//!
//! Note the seed is the same value as ratchet step 1. Both are pinned by
//! existing clients, so neither can change without breaking them.

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use crate::error::CryptoResult;
use crate::kdf::KeyDerivationEngine;
use crate::provider::{Argon2idHasher, Ed25519Signer, PasswordHashing, SignatureScheme};
use crate::{KEY_SIZE, PUBLIC_KEY_SIZE, SIGNATURE_SIZE};

/// Ed25519 seed. Zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey {
    bytes: [u8; KEY_SIZE],
}

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Signing identity for one (keyphrase, salt) pair
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: [u8; PUBLIC_KEY_SIZE],
}

#[derive(Debug, Clone)]
pub struct KeypairDeriver<H = Argon2idHasher, S = Ed25519Signer> {
    engine: KeyDerivationEngine<H>,
    signer: S,
}

impl KeypairDeriver {
    /// Protocol strong profile and Ed25519.
    pub fn new() -> Self {
        Self::with_parts(KeyDerivationEngine::new(), Ed25519Signer)
    }
}

impl Default for KeypairDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: PasswordHashing, S: SignatureScheme> KeypairDeriver<H, S> {
    pub fn with_parts(engine: KeyDerivationEngine<H>, signer: S) -> Self {
        Self { engine, signer }
    }

    /// Derive the keypair. Runs the strong profile every time; callers that
    /// need it repeatedly keep the result.
    pub fn derive_key_pair(&self, keyphrase: &SecretString, salt: &str) -> CryptoResult<KeyPair> {
        let seed = self
            .engine
            .strong_hash(keyphrase.expose_secret().as_bytes(), salt)?;
        let public_key = self.signer.public_key(seed.as_bytes());

        Ok(KeyPair {
            private_key: PrivateKey::from_bytes(*seed.as_bytes()),
            public_key,
        })
    }

    /// Deterministic signature: same key and message, same 64 bytes.
    pub fn sign(&self, message: &[u8], private_key: &PrivateKey) -> [u8; SIGNATURE_SIZE] {
        self.signer.sign(private_key.as_bytes(), message)
    }

    /// `false` on any mismatch or malformed input; never an error.
    ///
    /// Takes slices so callers can pass untrusted bytes straight through: a
    /// signature or public key of the wrong length simply does not verify.
    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let (Ok(signature), Ok(public_key)) = (
            <&[u8; SIGNATURE_SIZE]>::try_from(signature),
            <&[u8; PUBLIC_KEY_SIZE]>::try_from(public_key),
        ) else {
            return false;
        };
        self.signer.verify(public_key, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::KdfParams;

    fn test_deriver() -> KeypairDeriver {
        KeypairDeriver::with_parts(
            KeyDerivationEngine::with_hasher(
                Argon2idHasher,
                KdfParams {
                    mem_cost_kib: 64,
                    time_cost: 1,
                    parallelism: 1,
                },
                KdfParams::FAST,
            ),
            Ed25519Signer,
        )
    }

    #[test]
    fn test_derive_deterministic() {
        let deriver = test_deriver();
        let keyphrase = SecretString::from("keyphrase");

        let a = deriver.derive_key_pair(&keyphrase, "salt").unwrap();
        let b = deriver.derive_key_pair(&keyphrase, "salt").unwrap();

        assert_eq!(a.private_key.as_bytes(), b.private_key.as_bytes());
        assert_eq!(a.public_key, b.public_key);
    }

    #[test]
    fn test_derive_differs_per_salt() {
        let deriver = test_deriver();
        let keyphrase = SecretString::from("keyphrase");

        let a = deriver.derive_key_pair(&keyphrase, "space-a").unwrap();
        let b = deriver.derive_key_pair(&keyphrase, "space-b").unwrap();

        assert_ne!(a.public_key, b.public_key);
    }

    #[test]
    fn test_private_key_is_strong_hash() {
        let deriver = test_deriver();
        let pair = deriver
            .derive_key_pair(&SecretString::from("keyphrase"), "salt")
            .unwrap();
        let expected = deriver.engine.strong_hash(b"keyphrase", "salt").unwrap();

        assert_eq!(pair.private_key.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn test_sign_verify() {
        let deriver = test_deriver();
        let pair = deriver
            .derive_key_pair(&SecretString::from("keyphrase"), "salt")
            .unwrap();

        let signature = deriver.sign(b"challenge", &pair.private_key);
        assert_eq!(signature, deriver.sign(b"challenge", &pair.private_key));
        assert!(deriver.verify(b"challenge", &signature, &pair.public_key));
    }

    #[test]
    fn test_verify_rejects_alterations() {
        let deriver = test_deriver();
        let pair = deriver
            .derive_key_pair(&SecretString::from("keyphrase"), "salt")
            .unwrap();
        let other = deriver
            .derive_key_pair(&SecretString::from("other"), "salt")
            .unwrap();
        let signature = deriver.sign(b"challenge", &pair.private_key);

        assert!(!deriver.verify(b"challenge!", &signature, &pair.public_key));

        let mut bad_sig = signature;
        bad_sig[10] ^= 0x01;
        assert!(!deriver.verify(b"challenge", &bad_sig, &pair.public_key));

        assert!(!deriver.verify(b"challenge", &signature, &other.public_key));
    }

    #[test]
    fn test_verify_malformed_is_false() {
        let deriver = test_deriver();
        let pair = deriver
            .derive_key_pair(&SecretString::from("keyphrase"), "salt")
            .unwrap();
        let signature = deriver.sign(b"m", &pair.private_key);

        assert!(!deriver.verify(b"m", &signature[..63], &pair.public_key));
        assert!(!deriver.verify(b"m", &signature, &pair.public_key[..31]));
        assert!(!deriver.verify(b"m", &[], &[]));
    }
}
