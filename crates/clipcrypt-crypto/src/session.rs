//! Session layer: one authenticated (keyphrase, salt) and its ratchet cache
//!
//! The session owns the cache outright and mutates it through `&mut self`,
//! so the single-active-chain rule is enforced by the borrow checker rather
//! than by a process-wide singleton. Sharing a session between threads means
//! putting it behind a lock, which is the caller's explicit decision.

use secrecy::SecretString;
use serde_json::Value;

use crate::error::CryptoResult;
use crate::keypair::{KeyPair, KeypairDeriver};
use crate::metadata::{Metadata, MetadataCodec};
use crate::provider::{
    AeadCipher, AesGcmCipher, Argon2idHasher, Ed25519Signer, OsRandom, PasswordHashing,
    RandomSource, SignatureScheme,
};
use crate::ratchet::RatchetCache;
use crate::SIGNATURE_SIZE;

pub struct CryptoSession<H = Argon2idHasher, C = AesGcmCipher, R = OsRandom, S = Ed25519Signer> {
    keyphrase: SecretString,
    salt: String,
    cache: RatchetCache,
    metadata: MetadataCodec<H, C, R>,
    identity: KeypairDeriver<H, S>,
}

impl CryptoSession {
    /// Open a session with the protocol providers.
    pub fn open(keyphrase: SecretString, salt: impl Into<String>) -> Self {
        Self::with_parts(keyphrase, salt, MetadataCodec::new(), KeypairDeriver::new())
    }
}

impl<H, C, R, S> CryptoSession<H, C, R, S>
where
    H: PasswordHashing,
    C: AeadCipher,
    R: RandomSource,
    S: SignatureScheme,
{
    pub fn with_parts(
        keyphrase: SecretString,
        salt: impl Into<String>,
        metadata: MetadataCodec<H, C, R>,
        identity: KeypairDeriver<H, S>,
    ) -> Self {
        let salt = salt.into();
        let mut cache = RatchetCache::new();
        cache.init(&keyphrase, &salt);
        tracing::debug!(salt = %salt, "crypto session opened");

        Self {
            keyphrase,
            salt,
            cache,
            metadata,
            identity,
        }
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn cache(&self) -> &RatchetCache {
        &self.cache
    }

    /// Fresh metadata carrying a new random CEK.
    pub fn new_metadata(&self) -> CryptoResult<Metadata> {
        Ok(Metadata::new(self.metadata.codec().create_content_key()?))
    }

    pub fn encrypt_metadata(&mut self, index: i64, metadata: &Metadata) -> CryptoResult<Vec<u8>> {
        self.metadata
            .encrypt_metadata(&mut self.cache, &self.keyphrase, &self.salt, index, metadata)
    }

    pub fn encrypt_metadata_value(
        &mut self,
        index: i64,
        metadata: &Value,
    ) -> CryptoResult<Vec<u8>> {
        self.metadata.encrypt_metadata_value(
            &mut self.cache,
            &self.keyphrase,
            &self.salt,
            index,
            metadata,
        )
    }

    pub fn decrypt_metadata(&mut self, index: i64, blob: &[u8]) -> CryptoResult<Metadata> {
        self.metadata
            .decrypt_metadata(&mut self.cache, &self.keyphrase, &self.salt, index, blob)
    }

    pub fn encrypt_file(&self, metadata: &Metadata, file_bytes: &[u8]) -> CryptoResult<Vec<u8>> {
        self.metadata.encrypt_file(metadata, file_bytes)
    }

    pub fn decrypt_file(&self, metadata: &Metadata, blob: &[u8]) -> CryptoResult<Vec<u8>> {
        self.metadata.decrypt_file(metadata, blob)
    }

    /// Signing identity for this session. Recomputed on each call.
    pub fn key_pair(&self) -> CryptoResult<KeyPair> {
        self.identity.derive_key_pair(&self.keyphrase, &self.salt)
    }

    pub fn sign(&self, message: &[u8]) -> CryptoResult<[u8; SIGNATURE_SIZE]> {
        let pair = self.key_pair()?;
        Ok(self.identity.sign(message, &pair.private_key))
    }

    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        self.identity.verify(message, signature, public_key)
    }

    /// Switch to a new keyphrase. Every cached key of the old chain is wiped;
    /// blobs sealed under the old keyphrase no longer open in this session.
    pub fn change_keyphrase(&mut self, keyphrase: SecretString) {
        self.cache.clear();
        self.keyphrase = keyphrase;
        self.cache.init(&self.keyphrase, &self.salt);
    }

    /// End the session (logout).
    pub fn close(self) {}
}

impl<H, C, R, S> Drop for CryptoSession<H, C, R, S> {
    fn drop(&mut self) {
        self.cache.clear();
        tracing::debug!("crypto session closed");
    }
}

impl<H, C, R, S> std::fmt::Debug for CryptoSession<H, C, R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoSession")
            .field("salt", &self.salt)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
