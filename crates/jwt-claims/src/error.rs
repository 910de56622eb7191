//! Error types for hierarchical claim extraction.
//!
//! Every error is terminal: extraction aborts and no partial result is
//! returned. Display messages are stable and intentionally terse; the
//! detailed cause is available through [`std::error::Error::source`] and is
//! logged at debug level where it occurs.

use thiserror::Error;

/// Errors raised while extracting and validating claims from a token chain.
#[derive(Error, Debug)]
pub enum ClaimsError {
    /// A level of the chain is not a well-formed compact JWT.
    #[error("could not decode token")]
    Decode(#[source] DecodeFailure),

    /// A level failed signature, temporal or audience checks, or its key
    /// could not be resolved.
    #[error("could not verify token")]
    Verification(#[source] VerificationFailure),

    /// A level carrying configured claims has no `iss` claim.
    #[error("token issuer (iss) not found")]
    MissingIssuer,

    /// A key resolver is configured but no level of the chain was verified.
    #[error("at least one part of the token should be signed")]
    MissingSignature,

    /// Required claim names are absent from the merged result.
    #[error("missing required claim(s): {}", .missing.join(", "))]
    MissingClaim {
        /// Missing names, sorted.
        missing: Vec<String>,
    },

    /// A compact token exceeds [`crate::token::MAX_TOKEN_SIZE_BYTES`].
    #[error("token exceeds maximum allowed size")]
    TokenTooLarge,

    /// The chain of wrapped tokens is longer than the configured limit.
    #[error("token chain exceeds maximum length of {limit}")]
    ChainTooLong {
        /// Configured maximum number of levels.
        limit: u32,
    },
}

/// Why a compact token string could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    /// Compact form must have exactly three dot-separated segments.
    #[error("expected 3 segments, found {0}")]
    SegmentCount(usize),

    /// A segment is not valid unpadded base64url.
    #[error("invalid base64url segment: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Header or payload is not valid JSON.
    #[error("invalid JSON segment: {0}")]
    Json(#[from] serde_json::Error),

    /// Header or payload is JSON but not an object.
    #[error("{0} is not a JSON object")]
    NotAnObject(&'static str),

    /// Header carries no string `alg` field.
    #[error("header has no algorithm")]
    MissingAlgorithm,
}

/// Why a signed token level failed verification.
#[derive(Error, Debug)]
pub enum VerificationFailure {
    /// The key resolver could not provide a key.
    #[error(transparent)]
    KeyResolution(#[from] KeyResolutionError),

    /// Signed token has no `kid` header to resolve its key by.
    #[error("token header has no key id")]
    MissingKid,

    /// Algorithm is unknown or not an asymmetric signature scheme.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature, expiry, not-before or audience check failed.
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// `iat` lies further in the future than the configured leeway.
    #[error("issued-at is too far in the future")]
    IatTooFarInFuture,
}

/// Errors reported by a [`crate::keys::KeyResolver`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyResolutionError {
    /// No key is known under the requested id.
    #[error("no public key for key id '{0}'")]
    UnknownKeyId(String),

    /// The key source failed (network, storage, malformed key set).
    #[error("key source unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias using [`ClaimsError`].
pub type Result<T> = std::result::Result<T, ClaimsError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(
            ClaimsError::Decode(DecodeFailure::SegmentCount(1)).to_string(),
            "could not decode token"
        );
        assert_eq!(
            ClaimsError::Verification(VerificationFailure::MissingKid).to_string(),
            "could not verify token"
        );
        assert_eq!(
            ClaimsError::MissingSignature.to_string(),
            "at least one part of the token should be signed"
        );
    }

    #[test]
    fn test_missing_claim_lists_names() {
        let err = ClaimsError::MissingClaim {
            missing: vec!["bar".to_string(), "foo".to_string()],
        };
        assert_eq!(err.to_string(), "missing required claim(s): bar, foo");
    }

    #[test]
    fn test_cause_is_exposed_as_source() {
        let err = ClaimsError::Verification(VerificationFailure::KeyResolution(
            KeyResolutionError::UnknownKeyId("k1".to_string()),
        ));
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "no public key for key id 'k1'");
    }
}
