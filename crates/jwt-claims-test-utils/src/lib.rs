//! # jwt-claims Test Utilities
//!
//! Shared test utilities for the `jwt-claims` crate.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed Ed25519 keys for reproducible tests)
//! - Token builders (signed, unsigned and wrapping test tokens)
//! - Custom assertions (`ClaimAssertions`, `ClaimSetAssertions` traits)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwt_claims_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let keypair = TestKeypair::new(1, "0815");
//!     let inner = TestTokenBuilder::issued_by(ISSUER)
//!         .claim("scope", "test")
//!         .sign(&keypair);
//!     let outer = TestTokenBuilder::issued_by(OTHER_ISSUER)
//!         .wrapping(&inner)
//!         .unsigned();
//!
//!     let claims = extractor.extract(&outer)?;
//!     claims.expect_claim("scope").assert_verified().assert_depth(1);
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use token_builders::*;
