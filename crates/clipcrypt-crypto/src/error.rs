use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Every failure is fail-closed: no partial plaintext and no fallback key
/// material ever accompanies an error.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("neither a salt nor a hashed salt was supplied")]
    MissingSalt,

    #[error("invalid ratchet count {0}: the chain starts at 1")]
    InvalidRatchetCount(i64),

    #[error("metadata must be a JSON object, got {0}")]
    InvalidMetadataShape(&'static str),

    #[error("metadata has no contentKeyBase64 field")]
    MissingContentKey,

    #[error("contentKeyBase64 is malformed: {0}")]
    InvalidContentKey(String),

    /// Wrong key and corrupted data are indistinguishable here; telling the
    /// user which one it was is the caller's call.
    #[error("authentication failed: wrong key or tampered ciphertext")]
    AuthenticationFailure,

    /// Truncated blob: not even an IV and a tag.
    #[error("ciphertext too short: {len} bytes (minimum {min})")]
    CiphertextTooShort { len: usize, min: usize },

    #[error("invalid Argon2id params: {0}")]
    InvalidKdfParams(String),

    #[error("Argon2id KDF failed: {0}")]
    Kdf(String),

    #[error("AEAD encryption failed")]
    Encryption,

    #[error("random source failed: {0}")]
    Random(String),

    #[error("metadata serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CryptoError {
    /// The blob could not be opened: tampered, truncated, or sealed under a
    /// different key.
    pub fn is_undecryptable(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailure | Self::CiphertextTooShort { .. }
        )
    }
}
