//! Key derivation: two Argon2id cost profiles over one primitive
//!
//! - strong: the one-time derivation from a human keyphrase (~19 MiB, 2 passes)
//! - fast: re-hashing material that already has full entropy (8 KiB, 1 pass)
//!
//! The fast profile must never be applied to a keyphrase directly.

use std::time::Instant;

use clipcrypt_core::config::{KdfConfig, KdfProfileConfig};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::provider::{Argon2idHasher, PasswordHashing};
use crate::salt::SaltSource;
use crate::KEY_SIZE;

/// A 256-bit key produced by the engine.
///
/// Zeroized on drop to prevent secrets lingering in memory.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Argon2id parameters for one profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (Argon2 blocks are 1 KiB each)
    pub mem_cost_kib: u32,
    /// Time cost / iterations
    pub time_cost: u32,
    /// Parallelism
    pub parallelism: u32,
}

impl KdfParams {
    /// Protocol profile for keyphrase derivation.
    pub const STRONG: Self = Self {
        mem_cost_kib: 19456,
        time_cost: 2,
        parallelism: 1,
    };

    /// Protocol profile for ratchet steps.
    ///
    /// Argon2 counts memory in 1 KiB blocks and floors it at 8 blocks per
    /// lane, so 8 is the smallest legal value for a single lane.
    pub const FAST: Self = Self {
        mem_cost_kib: 8,
        time_cost: 1,
        parallelism: 1,
    };

    /// Reject costs Argon2id cannot run with.
    pub fn validate(&self) -> CryptoResult<()> {
        argon2::Params::new(
            self.mem_cost_kib,
            self.time_cost,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map(|_| ())
        .map_err(|e| CryptoError::InvalidKdfParams(e.to_string()))
    }
}

impl From<&KdfProfileConfig> for KdfParams {
    fn from(profile: &KdfProfileConfig) -> Self {
        Self {
            mem_cost_kib: profile.mem_cost_kib,
            time_cost: profile.time_cost,
            parallelism: profile.parallelism,
        }
    }
}

/// Argon2id wrapped in the strong and fast profiles.
#[derive(Debug, Clone)]
pub struct KeyDerivationEngine<H = Argon2idHasher> {
    hasher: H,
    strong: KdfParams,
    fast: KdfParams,
}

impl KeyDerivationEngine {
    /// Engine with the protocol profiles and the Argon2id provider.
    pub fn new() -> Self {
        Self::with_hasher(Argon2idHasher, KdfParams::STRONG, KdfParams::FAST)
    }

    /// Engine with profiles from the `[kdf]` config section.
    ///
    /// Both profiles are checked up front, so a bad fast profile cannot
    /// surface halfway through a ratchet.
    pub fn from_config(config: &KdfConfig) -> CryptoResult<Self> {
        let strong = KdfParams::from(&config.strong);
        let fast = KdfParams::from(&config.fast);
        strong.validate()?;
        fast.validate()?;
        if strong != KdfParams::STRONG || fast != KdfParams::FAST {
            tracing::warn!(
                ?strong,
                ?fast,
                "non-default KDF profiles: derived keys will not match other clients"
            );
        }
        Ok(Self::with_hasher(Argon2idHasher, strong, fast))
    }
}

impl Default for KeyDerivationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: PasswordHashing> KeyDerivationEngine<H> {
    pub fn with_hasher(hasher: H, strong: KdfParams, fast: KdfParams) -> Self {
        Self {
            hasher,
            strong,
            fast,
        }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn strong_params(&self) -> &KdfParams {
        &self.strong
    }

    pub fn fast_params(&self) -> &KdfParams {
        &self.fast
    }

    /// Expensive derivation from a human-chosen keyphrase.
    ///
    /// Takes hundreds of milliseconds at the protocol profile; keep it off
    /// latency-sensitive paths.
    pub fn strong_hash<'a>(
        &self,
        secret: &[u8],
        salt: impl Into<SaltSource<'a>>,
    ) -> CryptoResult<DerivedKey> {
        let started = Instant::now();
        let key = self.derive(secret, salt.into(), &self.strong)?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            mem_cost_kib = self.strong.mem_cost_kib,
            "strong derivation complete"
        );
        Ok(key)
    }

    /// Cheap re-hash of material that already has full entropy.
    pub fn fast_hash<'a>(
        &self,
        secret: &[u8],
        salt: impl Into<SaltSource<'a>>,
    ) -> CryptoResult<DerivedKey> {
        self.derive(secret, salt.into(), &self.fast)
    }

    fn derive(
        &self,
        secret: &[u8],
        salt: SaltSource<'_>,
        params: &KdfParams,
    ) -> CryptoResult<DerivedKey> {
        let hashed_salt = salt.resolve();
        let mut out = [0u8; KEY_SIZE];
        self.hasher
            .hash_into(secret, hashed_salt.as_bytes(), params, &mut out)?;
        let key = DerivedKey::from_bytes(out);
        out.zeroize();
        Ok(key)
    }
}
