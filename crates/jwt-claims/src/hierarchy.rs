//! Unwrapping of nested token chains.
//!
//! Tokens are processed from a worklist seeded with the outer token. Each
//! decoded level may push the token found in its wrap claim. Per level the
//! signature is verified and every configured claim present is recorded with
//! the level's issuer, verification status and depth.
//!
//! Depth is a processing counter: it is incremented once per processed
//! worklist item. With a single wrap claim per level the chain is linear, so
//! the counter equals the nesting depth.
//!
//! All per-call state lives in [`Extraction`], created fresh by
//! [`extract_chain`] and threaded through the loop by value; nothing is
//! shared between concurrent calls.

use crate::claims::ExtractedClaim;
use crate::error::ClaimsError;
use crate::policy::VerificationPolicy;
use crate::token::{self, RawToken};
use crate::value::ClaimValue;
use crate::verifier;
use std::collections::BTreeSet;

/// Accumulated result of walking one token chain.
#[derive(Debug)]
pub struct Extraction {
    /// Claims in processing order, not yet merged.
    pub claims: Vec<ExtractedClaim>,
    /// Number of levels whose signature was verified.
    pub verified_count: u32,
    /// Number of levels processed.
    pub levels: u32,
    /// The decoded outermost token.
    pub outer_token: RawToken,
}

/// Walk the token chain starting at `token`.
///
/// # Errors
///
/// - `ClaimsError::Decode` / `TokenTooLarge` - a level could not be decoded
/// - `ClaimsError::Verification` - a signed level failed verification
/// - `ClaimsError::MissingIssuer` - a level carrying configured claims has
///   no issuer
/// - `ClaimsError::ChainTooLong` - more than `policy.max_chain_length`
///   levels
pub fn extract_chain(
    token: &str,
    policy: &VerificationPolicy,
    claim_names: &BTreeSet<String>,
) -> Result<Extraction, ClaimsError> {
    let outer_token = token::decode(token)?;

    let mut worklist = vec![token.to_string()];
    let mut claims = Vec::new();
    let mut verified_count: u32 = 0;
    let mut depth: u32 = 0;

    while let Some(current) = worklist.pop() {
        if depth >= policy.max_chain_length {
            tracing::debug!(
                target: "jwt_claims.extractor",
                limit = policy.max_chain_length,
                "Token rejected: chain exceeds maximum length"
            );
            return Err(ClaimsError::ChainTooLong {
                limit: policy.max_chain_length,
            });
        }

        let level = if depth == 0 {
            outer_token.clone()
        } else {
            token::decode(&current)?
        };

        if let Some(wrapped) = token::wrapped_token(&level, &policy.wrap_claim_name) {
            worklist.push(wrapped);
        }

        let verified = verifier::verify(&level, policy)?;
        if verified {
            verified_count += 1;
        }

        claims.extend(extract_level(&level, claim_names, verified, depth)?);

        tracing::trace!(
            target: "jwt_claims.extractor",
            depth = depth,
            verified = verified,
            "Processed token level"
        );

        depth += 1;
    }

    Ok(Extraction {
        claims,
        verified_count,
        levels: depth,
        outer_token,
    })
}

/// Claims named in `claim_names` that are present (non-null) in `level`.
fn extract_level(
    level: &RawToken,
    claim_names: &BTreeSet<String>,
    verified: bool,
    depth: u32,
) -> Result<Vec<ExtractedClaim>, ClaimsError> {
    claim_names
        .iter()
        .filter_map(|name| level.claim(name).map(|node| (name, node)))
        .map(|(name, node)| {
            let issuer = level.issuer().ok_or_else(|| {
                tracing::debug!(target: "jwt_claims.extractor", depth = depth, "Token level has no issuer");
                ClaimsError::MissingIssuer
            })?;

            Ok(ExtractedClaim::new(
                name.clone(),
                ClaimValue::extract(node),
                issuer,
                verified,
                depth,
            ))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::keys::{PublicKey, StaticKeyResolver};
    use jwt_claims_test_utils::{TestKeypair, TestTokenBuilder, ISSUER, OTHER_ISSUER};
    use std::sync::Arc;

    const KEY_ID: &str = "0815";

    fn names(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn signing_policy(keypair: &TestKeypair) -> VerificationPolicy {
        let resolver = StaticKeyResolver::new().with_key(
            keypair.kid.clone(),
            PublicKey::from_der(keypair.public_key_bytes.clone()),
        );
        VerificationPolicy {
            key_resolver: Some(Arc::new(resolver)),
            ..VerificationPolicy::default()
        }
    }

    #[test]
    fn test_single_level() {
        let keypair = TestKeypair::new(1, KEY_ID);
        let token = TestTokenBuilder::issued_by(ISSUER)
            .claim("scope", "test")
            .claim("bar", "<bar>")
            .sign(&keypair);

        let extraction =
            extract_chain(&token, &signing_policy(&keypair), &names(&["scope", "foo"])).unwrap();

        assert_eq!(extraction.levels, 1);
        assert_eq!(extraction.verified_count, 1);
        assert_eq!(extraction.claims.len(), 1);
        let scope = &extraction.claims[0];
        assert_eq!(scope.name, "scope");
        assert_eq!(scope.value, ClaimValue::String("test".to_string()));
        assert_eq!(scope.issuer, "<issuer>");
        assert!(scope.verified);
        assert_eq!(scope.depth, 0);
        assert_eq!(extraction.outer_token.issuer(), Some("<issuer>"));
    }

    #[test]
    fn test_nested_levels_are_tagged_with_depth() {
        let keypair = TestKeypair::new(1, KEY_ID);
        let inner = TestTokenBuilder::issued_by(ISSUER)
            .claim("scope", "test")
            .claim("foo", "<foo>")
            .sign(&keypair);
        let outer = TestTokenBuilder::issued_by(OTHER_ISSUER)
            .claim("scope", "test test2")
            .wrapping(&inner)
            .unsigned();

        let extraction =
            extract_chain(&outer, &signing_policy(&keypair), &names(&["scope", "foo"])).unwrap();

        assert_eq!(extraction.levels, 2);
        assert_eq!(extraction.verified_count, 1);

        let summary: Vec<(&str, u32, bool)> = extraction
            .claims
            .iter()
            .map(|c| (c.name.as_str(), c.depth, c.verified))
            .collect();
        assert_eq!(
            summary,
            vec![("scope", 0, false), ("foo", 1, true), ("scope", 1, true)]
        );
        assert_eq!(extraction.claims[1].issuer, "<issuer>");
        assert_eq!(extraction.claims[0].issuer, "<otherIssuer>");
    }

    #[test]
    fn test_three_levels() {
        let keypair = TestKeypair::new(1, KEY_ID);
        let innermost = TestTokenBuilder::issued_by(ISSUER).claim("roles", "admin").sign(&keypair);
        let middle = TestTokenBuilder::issued_by(OTHER_ISSUER)
            .claim("roles", "user")
            .wrapping(&innermost)
            .unsigned();
        let outer = TestTokenBuilder::issued_by(OTHER_ISSUER)
            .claim("roles", "guest")
            .wrapping(&middle)
            .unsigned();

        let extraction =
            extract_chain(&outer, &signing_policy(&keypair), &names(&["roles"])).unwrap();

        let depths: Vec<u32> = extraction.claims.iter().map(|c| c.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(extraction.verified_count, 1);
    }

    #[test]
    fn test_custom_wrap_claim_name() {
        let inner = TestTokenBuilder::issued_by(OTHER_ISSUER).claim("scope", "inner").unsigned();
        let outer = TestTokenBuilder::issued_by(OTHER_ISSUER)
            .wrapping_as("act", &inner)
            .unsigned();
        let policy = VerificationPolicy {
            wrap_claim_name: "act".to_string(),
            ..VerificationPolicy::default()
        };

        let extraction = extract_chain(&outer, &policy, &names(&["scope"])).unwrap();

        assert_eq!(extraction.levels, 2);
        assert_eq!(extraction.claims.len(), 1);
        assert_eq!(extraction.claims[0].depth, 1);
    }

    #[test]
    fn test_missing_issuer_with_claims_is_fatal() {
        let token = TestTokenBuilder::new().claim("scope", "test").unsigned();

        let result = extract_chain(&token, &VerificationPolicy::default(), &names(&["scope"]));
        assert!(matches!(result, Err(ClaimsError::MissingIssuer)));
    }

    #[test]
    fn test_missing_issuer_without_claims_is_tolerated() {
        let token = TestTokenBuilder::new().claim("other", "x").unsigned();

        let extraction =
            extract_chain(&token, &VerificationPolicy::default(), &names(&["scope"])).unwrap();
        assert!(extraction.claims.is_empty());
    }

    #[test]
    fn test_null_claims_are_skipped() {
        let token = TestTokenBuilder::issued_by(OTHER_ISSUER)
            .claim("scope", serde_json::Value::Null)
            .unsigned();

        let extraction =
            extract_chain(&token, &VerificationPolicy::default(), &names(&["scope"])).unwrap();
        assert!(extraction.claims.is_empty());
    }

    #[test]
    fn test_invalid_wrapped_token_is_a_decode_error() {
        let outer = TestTokenBuilder::issued_by(OTHER_ISSUER)
            .wrapping("<not a token>")
            .unsigned();

        let result = extract_chain(&outer, &VerificationPolicy::default(), &names(&["scope"]));
        assert!(matches!(result, Err(ClaimsError::Decode(_))));
    }

    #[test]
    fn test_chain_length_is_bounded() {
        let mut token = TestTokenBuilder::issued_by(OTHER_ISSUER).unsigned();
        for _ in 0..3 {
            token = TestTokenBuilder::issued_by(OTHER_ISSUER).wrapping(&token).unsigned();
        }
        let policy = VerificationPolicy {
            max_chain_length: 3,
            ..VerificationPolicy::default()
        };

        let result = extract_chain(&token, &policy, &names(&["scope"]));
        assert!(matches!(result, Err(ClaimsError::ChainTooLong { limit: 3 })));

        let relaxed = VerificationPolicy {
            max_chain_length: 4,
            ..VerificationPolicy::default()
        };
        assert_eq!(extract_chain(&token, &relaxed, &names(&["scope"])).unwrap().levels, 4);
    }

    #[test]
    fn test_verification_failure_in_inner_level_aborts() {
        let signer = TestKeypair::new(1, KEY_ID);
        let inner = TestTokenBuilder::issued_by(ISSUER).expires_in(-100).sign(&signer);
        let outer = TestTokenBuilder::issued_by(OTHER_ISSUER).wrapping(&inner).unsigned();

        let result = extract_chain(&outer, &signing_policy(&signer), &names(&["scope"]));
        assert!(matches!(result, Err(ClaimsError::Verification(_))));
    }
}
