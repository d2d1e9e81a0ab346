use crate::constants::{DEFAULT_KEY_CACHE_CAPACITY, SCOPE_TERMINATOR, SIGNING_KEY_PREFIX};
use crate::lru::LruCache;
use aws4_core::hash::hmac_sha256;
use log::debug;
use once_cell::sync::Lazy;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

static GLOBAL_KEY_CACHE: Lazy<Arc<SigningKeyCache>> =
    Lazy::new(|| Arc::new(SigningKeyCache::new(DEFAULT_KEY_CACHE_CAPACITY)));

/// SigningKeyCache remembers derived signing keys so that signing many
/// requests with the same secret, date, region and service only walks the
/// HMAC ladder once.
///
/// The cache is shared behind a single mutex: both lookups and inserts
/// reorder the recency list.
pub struct SigningKeyCache {
    capacity: usize,
    inner: Mutex<LruCache<Vec<u8>>>,
}

impl Debug for SigningKeyCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Keys embed the secret, never print them.
        f.debug_struct("SigningKeyCache")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Default for SigningKeyCache {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_CACHE_CAPACITY)
    }
}

impl SigningKeyCache {
    /// Create a new cache holding at most `capacity` signing keys.
    ///
    /// With a zero capacity every call derives the key from scratch.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The process wide cache used by signers unless told otherwise.
    pub fn global() -> Arc<SigningKeyCache> {
        GLOBAL_KEY_CACHE.clone()
    }

    /// Capacity this cache was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("lock poisoned").len()
    }

    /// Returns true if no key is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the signing key for `(secret, date, region, service)`, deriving
    /// and caching it on a miss.
    pub fn derive(&self, secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
        let fingerprint = format!("{secret},{date},{region},{service}");

        let mut cache = self.inner.lock().expect("lock poisoned");
        if let Some(key) = cache.get(&fingerprint) {
            debug!("signing key cache hit for scope {date}/{region}/{service}");
            return key.clone();
        }

        debug!("signing key cache miss for scope {date}/{region}/{service}");
        let key = generate_signing_key(secret, date, region, service);
        cache.set(fingerprint, key.clone());
        key
    }
}

/// Walk the SigV4 key ladder: date, region, service, then the scope terminator.
pub fn generate_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("{SIGNING_KEY_PREFIX}{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), SCOPE_TERMINATOR.as_bytes())
}
