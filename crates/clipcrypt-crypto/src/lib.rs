//! clipcrypt-crypto: client-side E2E core for clipcrypt
//!
//! Nothing here ever sees the network. The server stores the blobs this
//! crate produces and never observes the keyphrase or any private key.
//!
//! Key hierarchy:
//! ```text
//! (keyphrase, salt)
//!   ├── HashedSalt = SHA-256(salt)                     (length normaliser, public)
//!   ├── k_1 = Argon2id-strong(keyphrase, HashedSalt)   (also the Ed25519 seed)
//!   │   └── k_n = Argon2id-fast(k_{n-1}, HashedSalt)   (ratchet, one MEK per entry)
//!   │       └── Metadata blob = AES-256-GCM(k_n, canonical JSON)
//!   │           └── contentKeyBase64 = CEK (random per file)
//!   │               └── File blob = AES-256-GCM(CEK, file bytes)
//! ```
//!
//! Blob format: `[16-byte IV][ciphertext][16-byte GCM tag]`

pub mod aead;
pub mod error;
pub mod kdf;
pub mod keypair;
pub mod metadata;
pub mod provider;
pub mod ratchet;
pub mod salt;
pub mod session;

pub use aead::{create_content_key, create_content_key_base64, AeadCodec, ContentKey};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{DerivedKey, KdfParams, KeyDerivationEngine};
pub use keypair::{KeyPair, KeypairDeriver, PrivateKey};
pub use metadata::{Metadata, MetadataCodec, CONTENT_KEY_FIELD};
pub use provider::{
    AeadCipher, AesGcmCipher, Argon2idHasher, Ed25519Signer, OsRandom, PasswordHashing,
    RandomSource, SignatureScheme,
};
pub use ratchet::{KeyRatchet, RatchetCache};
pub use salt::{digest_salt, HashedSalt, SaltSource};
pub use session::CryptoSession;

/// Size of every symmetric key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM IV prefixed to every blob
pub const IV_SIZE: usize = 16;

/// Size of the GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of an Ed25519 public key
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an Ed25519 signature
pub const SIGNATURE_SIZE: usize = 64;
