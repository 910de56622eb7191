//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible Ed25519 keypairs for signing test tokens.
//! All fixtures are deterministic based on seed values.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use jwt_claims::PublicKey;
use ring::signature::{Ed25519KeyPair, KeyPair};
use thiserror::Error;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Generate a deterministic Ed25519 signing key for testing.
///
/// The same seed always produces the same keypair.
///
/// # Returns
/// * `Ok((public_key_raw, private_key_pkcs8))` - Raw 32-byte public key and
///   PKCS#8 v1 DER private key
pub fn test_signing_key(seed: u8) -> Result<(Vec<u8>, Vec<u8>), FixtureError> {
    let mut seed_bytes = [0u8; 32];
    seed_bytes[0] = seed;
    for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }

    let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {:?}", e)))?;

    let public_key = key_pair.public_key().as_ref().to_vec();
    let pkcs8 = build_pkcs8_from_seed(&seed_bytes);

    Ok((public_key, pkcs8))
}

/// Build PKCS#8 v1 document from Ed25519 seed
///
/// Ring does not export PKCS#8 for a seeded keypair, so the DER is
/// assembled by hand. Test-only.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    let mut pkcs8 = Vec::with_capacity(48);

    // SEQUENCE, 46 bytes
    pkcs8.extend_from_slice(&[0x30, 0x2e]);
    // version INTEGER 0
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);
    // AlgorithmIdentifier SEQUENCE { OID 1.3.101.112 }
    pkcs8.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);
    // privateKey OCTET STRING { OCTET STRING seed }
    pkcs8.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    pkcs8.extend_from_slice(seed);

    pkcs8
}

/// Ed25519 keypair registered under a key id.
///
/// # Example
/// ```rust,ignore
/// let keypair = TestKeypair::new(1, "0815");
/// let token = TestTokenBuilder::issued_by(ISSUER).sign(&keypair);
/// let resolver = StaticKeyResolver::new().with_key(keypair.kid.clone(), keypair.public_key());
/// ```
#[derive(Debug, Clone)]
pub struct TestKeypair {
    /// Key id written to the `kid` header of signed tokens
    pub kid: String,
    /// Raw 32-byte Ed25519 public key
    pub public_key_bytes: Vec<u8>,
    /// PKCS#8 DER private key
    pub private_key_pkcs8: Vec<u8>,
}

impl TestKeypair {
    /// Create the deterministic keypair for `seed`, registered as `kid`.
    pub fn new(seed: u8, kid: &str) -> Self {
        let (public_key_bytes, private_key_pkcs8) =
            test_signing_key(seed).expect("Test keypair generation should succeed");
        Self {
            kid: kid.to_string(),
            public_key_bytes,
            private_key_pkcs8,
        }
    }

    /// Public key as library key material
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_der(self.public_key_bytes.clone())
    }

    /// Public key wrapped in PEM armor
    pub fn public_key_pem(&self) -> String {
        format!(
            "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----",
            STANDARD.encode(&self.public_key_bytes)
        )
    }

    /// Public key as the base64url `x` member of an OKP JWK
    pub fn public_key_jwk_x(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.public_key_bytes)
    }
}
