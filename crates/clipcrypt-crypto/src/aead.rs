//! AES-256-GCM blob framing
//!
//! Blob format (binary):
//! ```text
//! [16 bytes: random IV][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! The IV is drawn from the codec's random source on every call; there is
//! no way to pass one in.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::provider::{AeadCipher, AesGcmCipher, OsRandom, RandomSource};
use crate::{IV_SIZE, KEY_SIZE, TAG_SIZE};

/// A per-file 256-bit content-encryption key. Zeroized on drop.
///
/// Random, one per file, never derived from the keyphrase. It only ever
/// leaves memory inside encrypted metadata.
#[derive(Clone)]
pub struct ContentKey {
    bytes: [u8; KEY_SIZE],
}

impl ContentKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Standard alphabet, padded (44 characters).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let mut decoded = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidContentKey(format!("base64 decode: {e}")))?;

        if decoded.len() != KEY_SIZE {
            let len = decoded.len();
            decoded.zeroize();
            return Err(CryptoError::InvalidContentKey(format!(
                "decoded to {len} bytes (expected {KEY_SIZE})"
            )));
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }
}

impl Drop for ContentKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random content key from the OS CSPRNG.
pub fn create_content_key() -> CryptoResult<ContentKey> {
    AeadCodec::new().create_content_key()
}

/// Generate a random content key and return it base64-encoded.
pub fn create_content_key_base64() -> CryptoResult<String> {
    Ok(create_content_key()?.to_base64())
}

/// Seals and opens blobs with a caller-held key.
#[derive(Debug, Clone, Default)]
pub struct AeadCodec<C = AesGcmCipher, R = OsRandom> {
    cipher: C,
    rng: R,
}

impl AeadCodec {
    /// AES-256-GCM with OS randomness.
    pub fn new() -> Self {
        Self::with_providers(AesGcmCipher, OsRandom)
    }
}

impl<C: AeadCipher, R: RandomSource> AeadCodec<C, R> {
    pub fn with_providers(cipher: C, rng: R) -> Self {
        Self { cipher, rng }
    }

    /// Draw a fresh content key from this codec's random source.
    pub fn create_content_key(&self) -> CryptoResult<ContentKey> {
        let mut bytes = [0u8; KEY_SIZE];
        self.rng.fill(&mut bytes)?;
        let key = ContentKey::from_bytes(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Encrypt under a fresh IV.
    ///
    /// Returns: `[16-byte IV][ciphertext][16-byte tag]`
    pub fn encrypt(&self, key: &[u8; KEY_SIZE], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut iv = [0u8; IV_SIZE];
        self.rng.fill(&mut iv)?;

        let ciphertext = self.cipher.seal(key, &iv, plaintext)?;

        let mut result = Vec::with_capacity(IV_SIZE + ciphertext.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt a blob produced by [`AeadCodec::encrypt`].
    ///
    /// A failed tag check yields [`CryptoError::AuthenticationFailure`] and
    /// no plaintext at all. A blob shorter than IV plus tag is rejected
    /// earlier with [`CryptoError::CiphertextTooShort`]; callers that only
    /// care whether a blob opened should use
    /// [`CryptoError::is_undecryptable`], which covers both.
    pub fn decrypt(&self, key: &[u8; KEY_SIZE], blob: &[u8]) -> CryptoResult<Vec<u8>> {
        if blob.len() < IV_SIZE + TAG_SIZE {
            return Err(CryptoError::CiphertextTooShort {
                len: blob.len(),
                min: IV_SIZE + TAG_SIZE,
            });
        }

        let (iv_bytes, ciphertext) = blob.split_at(IV_SIZE);
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(iv_bytes);

        self.cipher.open(key, &iv, ciphertext).inspect_err(|e| {
            if matches!(e, CryptoError::AuthenticationFailure) {
                tracing::warn!(blob_len = blob.len(), "blob failed authentication");
            }
        })
    }
}
