//! Claim extraction for nested JWTs.
//!
//! [`ValidatingClaimsExtractor`] turns a compact token string into a
//! validated [`ClaimSet`]: the chain is decoded and verified level by level,
//! same-named claims are merged outer-to-inner, and the result is checked
//! for a verified level and for required claims.
//!
//! # Security
//!
//! - Every level is size-checked before parsing and the chain is bounded
//! - A signed level that fails verification aborts the whole call
//! - With a key resolver configured, at least one level must be verified
//! - Tokens never appear in spans or log fields

use crate::claims::ClaimSet;
use crate::error::ClaimsError;
use crate::hierarchy;
use crate::merge;
use crate::policy::VerificationPolicy;
use crate::validator::RequiredClaimsValidator;
use std::collections::BTreeSet;
use tracing::instrument;

/// Extracts and validates claims from nested JWTs.
///
/// Holds only the read-only policy, so one extractor can serve concurrent
/// calls. Per-call state is created inside [`extract`](Self::extract).
#[derive(Debug, Clone)]
pub struct ValidatingClaimsExtractor {
    policy: VerificationPolicy,
    claim_names: BTreeSet<String>,
    validator: RequiredClaimsValidator,
}

impl ValidatingClaimsExtractor {
    /// Create an extractor for `policy`.
    #[must_use]
    pub fn new(policy: VerificationPolicy) -> Self {
        let claim_names = policy.claim_names();
        let validator = RequiredClaimsValidator::new(policy.required_claim_names.clone());

        tracing::info!(
            target: "jwt_claims.extractor",
            key_resolver = policy.has_key_resolver(),
            claims = claim_names.len(),
            max_chain_length = policy.max_chain_length,
            "Claims extractor configured"
        );

        Self {
            policy,
            claim_names,
            validator,
        }
    }

    /// Extract the validated claim set from `token`.
    ///
    /// # Steps
    ///
    /// 1. Walk the chain: decode, verify and collect claims per level
    /// 2. Merge same-named claims into outer-to-inner chains
    /// 3. Require a verified level (only when a key resolver is configured)
    /// 4. Require every configured required claim
    ///
    /// # Errors
    ///
    /// - `ClaimsError::Decode` / `TokenTooLarge` - any level is malformed
    /// - `ClaimsError::Verification` - a signed level failed verification
    /// - `ClaimsError::MissingIssuer` - a level with claims has no `iss`
    /// - `ClaimsError::ChainTooLong` - the chain exceeds the configured limit
    /// - `ClaimsError::MissingSignature` - no level was verified
    /// - `ClaimsError::MissingClaim` - required claims are missing
    #[instrument(skip_all)]
    pub fn extract(&self, token: &str) -> Result<ClaimSet, ClaimsError> {
        let extraction = hierarchy::extract_chain(token, &self.policy, &self.claim_names)?;
        let claims = merge::merge(extraction.claims);

        if self.policy.has_key_resolver() {
            self.validator
                .ensure_at_least_one_verified(extraction.verified_count)?;
        }
        self.validator.ensure_required_present(&claims)?;

        tracing::debug!(
            target: "jwt_claims.extractor",
            levels = extraction.levels,
            verified = extraction.verified_count,
            claims = claims.len(),
            "Token chain validated"
        );

        Ok(ClaimSet {
            claims,
            verified_count: extraction.verified_count,
            outer_token: extraction.outer_token,
        })
    }

    #[must_use]
    pub fn has_key_resolver(&self) -> bool {
        self.policy.has_key_resolver()
    }

    #[must_use]
    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }
}
