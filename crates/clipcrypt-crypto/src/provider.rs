//! Primitive providers
//!
//! The core only composes primitives; it never implements them. Each seam is
//! a trait so the engine, codec and deriver take their primitives as
//! constructor arguments and tests can swap in deterministic doubles.

use aes_gcm::{
    aead::{consts::U16, Aead, KeyInit},
    aes::Aes256,
    AesGcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::KdfParams;
use crate::{IV_SIZE, KEY_SIZE, PUBLIC_KEY_SIZE, SIGNATURE_SIZE};

/// Memory-hard password hashing: (secret, salt, cost) -> key.
pub trait PasswordHashing {
    fn hash_into(
        &self,
        secret: &[u8],
        salt: &[u8],
        params: &KdfParams,
        out: &mut [u8; KEY_SIZE],
    ) -> CryptoResult<()>;
}

/// Cryptographically secure random bytes.
pub trait RandomSource {
    fn fill(&self, dest: &mut [u8]) -> CryptoResult<()>;
}

/// Symmetric AEAD with an explicit 16-byte IV.
///
/// `seal` returns `ciphertext || tag`; `open` takes the same layout and must
/// return nothing but an error when the tag does not verify.
pub trait AeadCipher {
    fn seal(
        &self,
        key: &[u8; KEY_SIZE],
        iv: &[u8; IV_SIZE],
        plaintext: &[u8],
    ) -> CryptoResult<Vec<u8>>;

    fn open(
        &self,
        key: &[u8; KEY_SIZE],
        iv: &[u8; IV_SIZE],
        ciphertext: &[u8],
    ) -> CryptoResult<Vec<u8>>;
}

/// Ed25519-compatible signatures keyed by a 32-byte seed.
pub trait SignatureScheme {
    fn public_key(&self, seed: &[u8; KEY_SIZE]) -> [u8; PUBLIC_KEY_SIZE];

    fn sign(&self, seed: &[u8; KEY_SIZE], message: &[u8]) -> [u8; SIGNATURE_SIZE];

    /// `false` on any mismatch, including a public key that is not a valid
    /// curve point.
    fn verify(
        &self,
        public_key: &[u8; PUBLIC_KEY_SIZE],
        message: &[u8],
        signature: &[u8; SIGNATURE_SIZE],
    ) -> bool;
}

/// Argon2id v1.3, no pepper, no associated data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2idHasher;

impl PasswordHashing for Argon2idHasher {
    fn hash_into(
        &self,
        secret: &[u8],
        salt: &[u8],
        params: &KdfParams,
        out: &mut [u8; KEY_SIZE],
    ) -> CryptoResult<()> {
        let argon2_params = Params::new(
            params.mem_cost_kib,
            params.time_cost,
            params.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::InvalidKdfParams(e.to_string()))?;

        Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
            .hash_password_into(secret, salt, out)
            .map_err(|e| CryptoError::Kdf(e.to_string()))
    }
}

/// Thread-local ChaCha CSPRNG seeded from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> CryptoResult<()> {
        rand::thread_rng()
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::Random(e.to_string()))
    }
}

/// AES-256-GCM with the 16-byte nonce of the blob format.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

impl AeadCipher for AesGcmCipher {
    fn seal(
        &self,
        key: &[u8; KEY_SIZE],
        iv: &[u8; IV_SIZE],
        plaintext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let cipher = Aes256Gcm16::new(key.into());
        cipher
            .encrypt(Nonce::<U16>::from_slice(iv), plaintext)
            .map_err(|_| CryptoError::Encryption)
    }

    fn open(
        &self,
        key: &[u8; KEY_SIZE],
        iv: &[u8; IV_SIZE],
        ciphertext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let cipher = Aes256Gcm16::new(key.into());
        cipher
            .decrypt(Nonce::<U16>::from_slice(iv), ciphertext)
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}

/// RFC 8032 Ed25519 via ed25519-dalek.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Signer;

impl SignatureScheme for Ed25519Signer {
    fn public_key(&self, seed: &[u8; KEY_SIZE]) -> [u8; PUBLIC_KEY_SIZE] {
        SigningKey::from_bytes(seed).verifying_key().to_bytes()
    }

    fn sign(&self, seed: &[u8; KEY_SIZE], message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        SigningKey::from_bytes(seed).sign(message).to_bytes()
    }

    fn verify(
        &self,
        public_key: &[u8; PUBLIC_KEY_SIZE],
        message: &[u8],
        signature: &[u8; SIGNATURE_SIZE],
    ) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
            return false;
        };
        verifying_key
            .verify(message, &Signature::from_bytes(signature))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argon2_rejects_bad_params() {
        let params = KdfParams {
            mem_cost_kib: 1,
            time_cost: 1,
            parallelism: 1,
        };
        let mut out = [0u8; KEY_SIZE];
        let result = Argon2idHasher.hash_into(b"secret", &[0u8; 32], &params, &mut out);
        assert!(matches!(result, Err(CryptoError::InvalidKdfParams(_))));
    }

    #[test]
    fn test_os_random_fills() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsRandom.fill(&mut a).unwrap();
        OsRandom.fill(&mut b).unwrap();
        assert_ne!(a, b, "two draws must differ");
    }

    #[test]
    fn test_aes_gcm_seal_layout() {
        let ct = AesGcmCipher
            .seal(&[7u8; KEY_SIZE], &[1u8; IV_SIZE], b"0123456789")
            .unwrap();
        // ciphertext (10) + tag (16)
        assert_eq!(ct.len(), 10 + 16);
    }

    #[test]
    fn test_aes_gcm_open_wrong_iv() {
        let key = [7u8; KEY_SIZE];
        let ct = AesGcmCipher.seal(&key, &[1u8; IV_SIZE], b"data").unwrap();
        let result = AesGcmCipher.open(&key, &[2u8; IV_SIZE], &ct);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_ed25519_invalid_point_is_false() {
        // y = 2 does not decompress to a curve point
        let mut bogus = [0u8; PUBLIC_KEY_SIZE];
        bogus[0] = 2;
        assert!(!Ed25519Signer.verify(&bogus, b"msg", &[0u8; SIGNATURE_SIZE]));
    }
}
