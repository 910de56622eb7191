//! Public key material and key resolution.
//!
//! The engine resolves verification keys synchronously through a
//! [`KeyResolver`]. Fetching remote key sets is the resolver's business;
//! [`CachingKeyResolver`] keeps resolved keys around so a slow key source is
//! not hit on every request.

use crate::error::KeyResolutionError;
use base64::{engine::general_purpose, Engine};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default cache TTL in seconds (5 minutes).
pub const DEFAULT_KEY_CACHE_TTL_SECONDS: u64 = 300;

/// Public key bytes used to verify one token level.
///
/// How the bytes are interpreted depends on the token's algorithm: raw
/// 32-byte key for `EdDSA`, DER for RSA and EC families.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    #[must_use]
    pub fn from_der(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a key from PEM, with or without header/footer lines.
    ///
    /// # Errors
    ///
    /// Returns `base64::DecodeError` if the base64 content cannot be decoded.
    pub fn from_pem(pem: &str) -> Result<Self, base64::DecodeError> {
        let b64: String = pem
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .map(str::trim)
            .collect();

        general_purpose::STANDARD.decode(b64).map(Self)
    }

    /// Decode an `EdDSA` key from a JWK `x` field (base64url, no padding).
    ///
    /// # Errors
    ///
    /// Returns `base64::DecodeError` if the base64url content cannot be decoded.
    pub fn from_jwk_x(x_b64url: &str) -> Result<Self, base64::DecodeError> {
        general_purpose::URL_SAFE_NO_PAD.decode(x_b64url).map(Self)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.0.len()).finish()
    }
}

/// Maps a key id to public key material.
///
/// Implementations are shared across concurrent extractions and must be
/// safe for concurrent reads. They may block (e.g. on network I/O); the
/// engine imposes no timeout and does not retry.
pub trait KeyResolver: Send + Sync {
    /// Resolve the public key registered under `key_id`.
    ///
    /// # Errors
    ///
    /// Returns `KeyResolutionError` if the key is unknown or the key source
    /// is unavailable.
    fn resolve_public_key(&self, key_id: &str) -> Result<PublicKey, KeyResolutionError>;
}

impl<F> KeyResolver for F
where
    F: Fn(&str) -> Result<PublicKey, KeyResolutionError> + Send + Sync,
{
    fn resolve_public_key(&self, key_id: &str) -> Result<PublicKey, KeyResolutionError> {
        self(key_id)
    }
}

/// Fixed in-memory key set.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyResolver {
    keys: HashMap<String, PublicKey>,
}

impl StaticKeyResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under `key_id`, replacing any previous key.
    #[must_use]
    pub fn with_key(mut self, key_id: impl Into<String>, key: PublicKey) -> Self {
        self.keys.insert(key_id.into(), key);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyResolver for StaticKeyResolver {
    fn resolve_public_key(&self, key_id: &str) -> Result<PublicKey, KeyResolutionError> {
        self.keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| KeyResolutionError::UnknownKeyId(key_id.to_string()))
    }
}

/// Cached key with expiry time.
struct CachedKey {
    key: PublicKey,
    expires_at: Instant,
}

/// Caches keys from an inner resolver per key id with a TTL.
///
/// Failed lookups are not cached, so a transient key source failure is
/// retried on the next request.
pub struct CachingKeyResolver<R> {
    inner: R,
    cache: RwLock<HashMap<String, CachedKey>>,
    cache_ttl: Duration,
}

impl<R: KeyResolver> CachingKeyResolver<R> {
    /// Wrap `inner` with the default TTL.
    pub fn new(inner: R) -> Self {
        Self::with_ttl(inner, Duration::from_secs(DEFAULT_KEY_CACHE_TTL_SECONDS))
    }

    pub fn with_ttl(inner: R, cache_ttl: Duration) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            cache_ttl,
        }
    }

    /// Drop all cached keys.
    pub fn invalidate(&self) {
        let mut cache = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.clear();
    }

    fn cached(&self, key_id: &str) -> Option<PublicKey> {
        let cache = match self.cache.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache
            .get(key_id)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.key.clone())
    }
}

impl<R: KeyResolver> KeyResolver for CachingKeyResolver<R> {
    fn resolve_public_key(&self, key_id: &str) -> Result<PublicKey, KeyResolutionError> {
        if let Some(key) = self.cached(key_id) {
            tracing::trace!(target: "jwt_claims.keys", kid = %key_id, "Key cache hit");
            return Ok(key);
        }

        tracing::debug!(target: "jwt_claims.keys", kid = %key_id, "Key cache miss, resolving");
        let key = self.inner.resolve_public_key(key_id).inspect_err(|e| {
            tracing::warn!(target: "jwt_claims.keys", kid = %key_id, error = %e, "Key resolution failed");
        })?;

        let mut cache = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(
            key_id.to_string(),
            CachedKey {
                key: key.clone(),
                expires_at: Instant::now() + self.cache_ttl,
            },
        );

        Ok(key)
    }
}

impl<R> fmt::Debug for CachingKeyResolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingKeyResolver")
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}
