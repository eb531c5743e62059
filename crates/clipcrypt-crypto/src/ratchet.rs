//! Sequential key ratchet with a single-session memo cache
//!
//! ```text
//! k_1 = strong(keyphrase, SHA-256(salt))
//! k_n = fast(k_{n-1}, SHA-256(salt))      n >= 2
//! ```
//!
//! Each metadata entry `n` is sealed with `k_n`. Holding `k_n` and the public
//! salt does not give `k_{n-1}`: the chain only runs forward.
//!
//! The cache holds one chain at a time. It belongs to the session that owns
//! the keyphrase and is passed in by `&mut`; touching it with a different
//! (keyphrase, salt) pair drops the previous chain wholesale. Callers that
//! need the cache across threads wrap the owner in a lock themselves.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{DerivedKey, KeyDerivationEngine};
use crate::provider::{Argon2idHasher, PasswordHashing};
use crate::salt::{digest_salt, HashedSalt};

/// The chain for one (keyphrase, salt) pair. `keys[i]` is `k_{i+1}`.
struct Chain {
    keyphrase: SecretString,
    salt: String,
    hashed_salt: HashedSalt,
    keys: Vec<DerivedKey>,
}

impl Chain {
    fn matches(&self, keyphrase: &SecretString, salt: &str) -> bool {
        self.salt == salt && self.keyphrase.expose_secret() == keyphrase.expose_secret()
    }
}

/// Memoized ratchet steps for the active (keyphrase, salt) pair.
#[derive(Default)]
pub struct RatchetCache {
    chain: Option<Chain>,
}

impl RatchetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `(keyphrase, salt)` the active pair.
    ///
    /// A no-op when the pair is already active; otherwise the previous chain
    /// (if any) is discarded and an empty one started.
    pub fn init(&mut self, keyphrase: &SecretString, salt: &str) {
        self.chain_for(keyphrase, salt);
    }

    /// Drop every cached key (logout, keyphrase change).
    pub fn clear(&mut self) {
        if self.chain.take().is_some() {
            tracing::debug!("ratchet cache cleared");
        }
    }

    pub fn is_active_for(&self, keyphrase: &SecretString, salt: &str) -> bool {
        self.chain
            .as_ref()
            .is_some_and(|chain| chain.matches(keyphrase, salt))
    }

    /// Number of consecutive steps cached for the active pair.
    pub fn cached_steps(&self) -> usize {
        self.chain.as_ref().map_or(0, |chain| chain.keys.len())
    }

    /// Cached `k_index` for the pair, without computing anything. Indices
    /// outside the chain (including `index <= 0`) are simply absent.
    pub fn get(&self, keyphrase: &SecretString, salt: &str, index: i64) -> Option<&DerivedKey> {
        let chain = self.chain.as_ref().filter(|c| c.matches(keyphrase, salt))?;
        let slot = usize::try_from(index).ok()?.checked_sub(1)?;
        chain.keys.get(slot)
    }

    fn chain_for(&mut self, keyphrase: &SecretString, salt: &str) -> &mut Chain {
        let stale = self
            .chain
            .as_ref()
            .is_some_and(|chain| !chain.matches(keyphrase, salt));
        if stale {
            tracing::debug!("ratchet cache evicted: active keyphrase/salt changed");
            self.chain = None;
        }

        self.chain.get_or_insert_with(|| Chain {
            keyphrase: keyphrase.clone(),
            salt: salt.to_string(),
            hashed_salt: digest_salt(salt),
            keys: Vec::new(),
        })
    }
}

impl std::fmt::Debug for RatchetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatchetCache")
            .field("active", &self.chain.is_some())
            .field("cached_steps", &self.cached_steps())
            .finish()
    }
}

/// Produces the n-th key of the chain rooted at (keyphrase, salt).
#[derive(Debug, Clone)]
pub struct KeyRatchet<H = Argon2idHasher> {
    engine: KeyDerivationEngine<H>,
}

impl Default for KeyRatchet {
    fn default() -> Self {
        Self::new(KeyDerivationEngine::new())
    }
}

impl<H: PasswordHashing> KeyRatchet<H> {
    pub fn new(engine: KeyDerivationEngine<H>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &KeyDerivationEngine<H> {
        &self.engine
    }

    /// Return `k_index`, computing only the steps not already cached.
    pub fn ratchet(
        &self,
        cache: &mut RatchetCache,
        keyphrase: &SecretString,
        salt: &str,
        index: i64,
    ) -> CryptoResult<DerivedKey> {
        let target = usize::try_from(index)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(CryptoError::InvalidRatchetCount(index))?;

        let chain = cache.chain_for(keyphrase, salt);
        let cached = chain.keys.len();

        if cached >= target {
            tracing::debug!(index, "ratchet cache hit");
            return Ok(chain.keys[target - 1].clone());
        }

        tracing::debug!(index, cached, "ratchet cache miss");

        let mut current = match chain.keys.last() {
            Some(last) => last.clone(),
            None => {
                let first = self
                    .engine
                    .strong_hash(keyphrase.expose_secret().as_bytes(), &chain.hashed_salt)?;
                chain.keys.push(first.clone());
                first
            }
        };

        while chain.keys.len() < target {
            current = self
                .engine
                .fast_hash(current.as_bytes(), &chain.hashed_salt)?;
            chain.keys.push(current.clone());
        }

        Ok(current)
    }
}
