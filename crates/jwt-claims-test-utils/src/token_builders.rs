//! Builder patterns for test token construction
//!
//! Provides a fluent API for creating compact test tokens: unsigned, signed
//! with a [`TestKeypair`], or wrapping other tokens.

use crate::crypto_fixtures::TestKeypair;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Issuer of signed test tokens
pub const ISSUER: &str = "<issuer>";

/// Issuer of unsigned wrapper tokens
pub const OTHER_ISSUER: &str = "<otherIssuer>";

/// Claim holding a wrapped token by default
pub const WRAP_CLAIM: &str = "jwt";

/// Builder for creating compact test tokens
///
/// Defaults: no issuer, `iat` now, `exp` one hour from now.
///
/// # Example
/// ```rust,ignore
/// let inner = TestTokenBuilder::issued_by(ISSUER)
///     .claim("scope", "test")
///     .sign(&keypair);
/// let outer = TestTokenBuilder::issued_by(OTHER_ISSUER)
///     .wrapping(&inner)
///     .unsigned();
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
    include_kid: bool,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(3600)).timestamp()),
        );
        Self {
            claims,
            include_kid: true,
        }
    }

    /// Create a builder whose tokens carry `iss`
    pub fn issued_by(issuer: &str) -> Self {
        Self::new().claim("iss", issuer)
    }

    /// Set an arbitrary claim, replacing any previous value
    pub fn claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(name.to_string(), value.into());
        self
    }

    /// Remove a claim, including the `iat`/`exp` defaults
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Embed `token` under the default wrap claim
    pub fn wrapping(self, token: &str) -> Self {
        self.wrapping_as(WRAP_CLAIM, token)
    }

    /// Embed `token` under `claim`
    pub fn wrapping_as(self, claim: &str, token: &str) -> Self {
        self.claim(claim, token)
    }

    /// Set expiration in seconds from now (negative for expired tokens)
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.claim("exp", exp)
    }

    /// Set issued-at timestamp
    pub fn issued_at(self, timestamp: i64) -> Self {
        self.claim("iat", timestamp)
    }

    /// Set not-before in seconds from now
    pub fn not_before_in(self, seconds: i64) -> Self {
        let nbf = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.claim("nbf", nbf)
    }

    /// Set the audience
    pub fn audience(self, audience: &str) -> Self {
        self.claim("aud", audience)
    }

    /// Omit the `kid` header from signed tokens
    pub fn without_key_id(mut self) -> Self {
        self.include_kid = false;
        self
    }

    /// Build the claims as a JSON value
    pub fn build_claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign with `keypair` using EdDSA
    pub fn sign(self, keypair: &TestKeypair) -> String {
        let mut header = Header::new(Algorithm::EdDSA);
        if self.include_kid {
            header.kid = Some(keypair.kid.clone());
        }
        let key = EncodingKey::from_ed_der(&keypair.private_key_pkcs8);

        encode(&header, &self.build_claims(), &key).expect("Test token signing should succeed")
    }

    /// Sign with an HMAC secret; used to exercise algorithm rejection
    pub fn sign_hs256(self, secret: &[u8], kid: &str) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_secret(secret);

        encode(&header, &self.build_claims(), &key).expect("Test token signing should succeed")
    }

    /// Encode with `alg: none` and an empty signature segment
    pub fn unsigned(self) -> String {
        let header = json!({"alg": "none", "typ": "JWT"});
        format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(self.build_claims().to_string())
        )
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the payload of a compact token without verifying it
pub fn peek_claims(token: &str) -> Value {
    let payload = token.split('.').nth(1).expect("Token must have a payload");
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .expect("Invalid JWT payload");
    serde_json::from_slice(&bytes).expect("Failed to parse JWT claims")
}
