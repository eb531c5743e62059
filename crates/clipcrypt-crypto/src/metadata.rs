//! Encrypted metadata and the file bodies it unlocks
//!
//! Metadata is one JSON object. `contentKeyBase64` (standard, padded base64
//! of the file's 32-byte CEK) is mandatory; every other field is opaque
//! application data that must survive a round trip unchanged.
//!
//! Entry `n` is sealed with ratchet key `k_n`. File bodies are sealed with
//! the CEK directly: the CEK is random and single-use, so no KDF is involved.
//!
//! Plaintext is canonical JSON: compact, keys in sorted order.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use zeroize::Zeroize;

use crate::aead::{AeadCodec, ContentKey};
use crate::error::{CryptoError, CryptoResult};
use crate::provider::{
    AeadCipher, AesGcmCipher, Argon2idHasher, OsRandom, PasswordHashing, RandomSource,
};
use crate::ratchet::{KeyRatchet, RatchetCache};

/// JSON field carrying the CEK.
pub const CONTENT_KEY_FIELD: &str = "contentKeyBase64";

/// Decrypted metadata for one file.
#[derive(Debug, Clone)]
pub struct Metadata {
    content_key: ContentKey,
    extra: Map<String, Value>,
}

impl Metadata {
    pub fn new(content_key: ContentKey) -> Self {
        Self {
            content_key,
            extra: Map::new(),
        }
    }

    /// Attach an application field.
    ///
    /// `contentKeyBase64` is reserved for the content key and is ignored
    /// here; the typed key is its only source.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if name == CONTENT_KEY_FIELD {
            tracing::debug!("ignoring application field that collides with the content key");
            return self;
        }
        self.extra.insert(name, value.into());
        self
    }

    pub fn content_key(&self) -> &ContentKey {
        &self.content_key
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Application fields, without the content key.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Validate loosely typed JSON at the boundary.
    pub fn from_value(value: Value) -> CryptoResult<Self> {
        let mut extra = match value {
            Value::Object(map) => map,
            other => return Err(CryptoError::InvalidMetadataShape(value_kind(&other))),
        };

        let encoded = match extra.remove(CONTENT_KEY_FIELD) {
            Some(Value::String(encoded)) => encoded,
            Some(other) => {
                return Err(CryptoError::InvalidContentKey(format!(
                    "expected a string, got {}",
                    value_kind(&other)
                )))
            }
            None => return Err(CryptoError::MissingContentKey),
        };

        Ok(Self {
            content_key: ContentKey::from_base64(&encoded)?,
            extra,
        })
    }

    /// Single JSON object: `extra` merged with `contentKeyBase64`.
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert(
            CONTENT_KEY_FIELD.to_string(),
            Value::String(self.content_key.to_base64()),
        );
        Value::Object(map)
    }

    /// Compact JSON with sorted keys.
    pub fn to_canonical_json(&self) -> CryptoResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_value())?)
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        self.content_key.as_bytes() == other.content_key.as_bytes() && self.extra == other.extra
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ratchet + AEAD for metadata entries, CEK + AEAD for file bodies.
#[derive(Debug, Clone)]
pub struct MetadataCodec<H = Argon2idHasher, C = AesGcmCipher, R = OsRandom> {
    ratchet: KeyRatchet<H>,
    codec: AeadCodec<C, R>,
}

impl MetadataCodec {
    /// Protocol KDF profiles, AES-256-GCM, OS randomness.
    pub fn new() -> Self {
        Self::with_parts(KeyRatchet::default(), AeadCodec::new())
    }
}

impl Default for MetadataCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: PasswordHashing, C: AeadCipher, R: RandomSource> MetadataCodec<H, C, R> {
    pub fn with_parts(ratchet: KeyRatchet<H>, codec: AeadCodec<C, R>) -> Self {
        Self { ratchet, codec }
    }

    pub fn ratchet(&self) -> &KeyRatchet<H> {
        &self.ratchet
    }

    pub fn codec(&self) -> &AeadCodec<C, R> {
        &self.codec
    }

    /// Seal `metadata` as entry `index` under `k_index`.
    pub fn encrypt_metadata(
        &self,
        cache: &mut RatchetCache,
        keyphrase: &SecretString,
        salt: &str,
        index: i64,
        metadata: &Metadata,
    ) -> CryptoResult<Vec<u8>> {
        let mut plaintext = metadata.to_canonical_json()?;
        let result = self.seal_entry(cache, keyphrase, salt, index, &plaintext);
        plaintext.zeroize();
        result
    }

    /// Seal loosely typed JSON. Anything but an object is rejected before
    /// any key is derived.
    pub fn encrypt_metadata_value(
        &self,
        cache: &mut RatchetCache,
        keyphrase: &SecretString,
        salt: &str,
        index: i64,
        metadata: &Value,
    ) -> CryptoResult<Vec<u8>> {
        if !metadata.is_object() {
            return Err(CryptoError::InvalidMetadataShape(value_kind(metadata)));
        }
        let mut plaintext = serde_json::to_vec(metadata)?;
        let result = self.seal_entry(cache, keyphrase, salt, index, &plaintext);
        plaintext.zeroize();
        result
    }

    /// Open entry `index` and validate it.
    pub fn decrypt_metadata(
        &self,
        cache: &mut RatchetCache,
        keyphrase: &SecretString,
        salt: &str,
        index: i64,
        blob: &[u8],
    ) -> CryptoResult<Metadata> {
        let key = self.ratchet.ratchet(cache, keyphrase, salt, index)?;
        let mut plaintext = self.codec.decrypt(key.as_bytes(), blob)?;
        let parsed = serde_json::from_slice::<Value>(&plaintext);
        plaintext.zeroize();
        Metadata::from_value(parsed?)
    }

    /// Seal a file body with the CEK carried in `metadata`.
    pub fn encrypt_file(&self, metadata: &Metadata, file_bytes: &[u8]) -> CryptoResult<Vec<u8>> {
        self.codec
            .encrypt(metadata.content_key().as_bytes(), file_bytes)
    }

    /// Open a file body with the CEK carried in `metadata`.
    pub fn decrypt_file(&self, metadata: &Metadata, blob: &[u8]) -> CryptoResult<Vec<u8>> {
        self.codec.decrypt(metadata.content_key().as_bytes(), blob)
    }

    fn seal_entry(
        &self,
        cache: &mut RatchetCache,
        keyphrase: &SecretString,
        salt: &str,
        index: i64,
        plaintext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let key = self.ratchet.ratchet(cache, keyphrase, salt, index)?;
        self.codec.encrypt(key.as_bytes(), plaintext)
    }
}
