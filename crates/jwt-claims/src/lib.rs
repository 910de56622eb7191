//! Hierarchical claim extraction for nested JWTs.
//!
//! A token may carry another compact token in a wrap claim (`jwt` by
//! default), forming a chain. [`ValidatingClaimsExtractor`] walks that
//! chain, verifies each signed level through a [`KeyResolver`], and returns
//! a [`ClaimSet`] in which every claim links to the same-named claims found
//! in deeper levels.
//!
//! ```rust,ignore
//! use jwt_claims::{ExtractorConfig, StaticKeyResolver, ValidatingClaimsExtractor};
//! use std::sync::Arc;
//!
//! let resolver = StaticKeyResolver::new().with_key("key-1", public_key);
//! let policy = ExtractorConfig::from_env()?.into_policy(Some(Arc::new(resolver)));
//! let extractor = ValidatingClaimsExtractor::new(policy);
//!
//! let claims = extractor.extract(&token)?;
//! if let Some(scope) = claims.get("scope") {
//!     for level in scope.chain() {
//!         println!("{} from {} (verified: {})", level.depth, level.issuer, level.verified);
//!     }
//! }
//! ```

#![warn(clippy::pedantic)]

/// Error types
pub mod error;

/// Claim values by JSON kind
pub mod value;

/// Compact token decoding
pub mod token;

/// Public keys and key resolvers
pub mod keys;

/// Verification policy shared by all extractions
pub mod policy;

/// Environment-driven configuration
pub mod config;

/// Per-level signature verification
pub mod verifier;

/// Extracted claims and the claim set
pub mod claims;

/// Walking nested token chains
pub mod hierarchy;

/// Linking same-named claims across levels
pub mod merge;

/// Verified-level and required-claim checks
pub mod validator;

/// Extraction entry point
pub mod extractor;

pub use claims::{ClaimSet, ExtractedClaim};
pub use config::{ConfigError, ExtractorConfig};
pub use error::{ClaimsError, DecodeFailure, KeyResolutionError, VerificationFailure};
pub use extractor::ValidatingClaimsExtractor;
pub use keys::{CachingKeyResolver, KeyResolver, PublicKey, StaticKeyResolver};
pub use policy::VerificationPolicy;
pub use token::RawToken;
pub use value::ClaimValue;
