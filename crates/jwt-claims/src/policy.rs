//! Verification policy shared by all extractions.

use crate::keys::KeyResolver;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Claim holding a wrapped token unless configured otherwise.
pub const DEFAULT_WRAP_CLAIM_NAME: &str = "jwt";

/// Maximum number of chain levels processed unless configured otherwise.
pub const DEFAULT_MAX_CHAIN_LENGTH: u32 = 16;

/// Claim names always extracted, in addition to required and optional ones.
pub const AUTHORIZATION_CLAIMS: [&str; 3] = ["scope", "authorization", "roles"];

/// How token chains are verified and which claims are extracted.
///
/// Constructed once and shared read-only across concurrent extractions.
/// Without a `key_resolver` no level is ever verified and the "at least one
/// verified level" check is skipped.
#[derive(Clone)]
pub struct VerificationPolicy {
    /// Clock skew tolerance in seconds for `exp`, `nbf` and `iat`.
    pub leeway_seconds: u32,

    /// Accepted audiences; when non-empty a token's `aud` must intersect it.
    pub audiences: BTreeSet<String>,

    /// Claims that must be present somewhere in the chain.
    pub required_claim_names: BTreeSet<String>,

    /// Claims extracted when present.
    pub optional_claim_names: BTreeSet<String>,

    /// Claim whose string value is a wrapped compact token.
    pub wrap_claim_name: String,

    /// Upper bound on levels processed per extraction.
    pub max_chain_length: u32,

    /// Source of verification keys.
    pub key_resolver: Option<Arc<dyn KeyResolver>>,
}

impl VerificationPolicy {
    /// Every claim name extracted from each level: required, optional and
    /// the [`AUTHORIZATION_CLAIMS`] baseline.
    #[must_use]
    pub fn claim_names(&self) -> BTreeSet<String> {
        self.required_claim_names
            .iter()
            .chain(self.optional_claim_names.iter())
            .cloned()
            .chain(AUTHORIZATION_CLAIMS.iter().map(ToString::to_string))
            .collect()
    }

    #[must_use]
    pub fn has_key_resolver(&self) -> bool {
        self.key_resolver.is_some()
    }
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            leeway_seconds: 0,
            audiences: BTreeSet::new(),
            required_claim_names: BTreeSet::new(),
            optional_claim_names: BTreeSet::new(),
            wrap_claim_name: DEFAULT_WRAP_CLAIM_NAME.to_string(),
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
            key_resolver: None,
        }
    }
}

impl fmt::Debug for VerificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationPolicy")
            .field("leeway_seconds", &self.leeway_seconds)
            .field("audiences", &self.audiences)
            .field("required_claim_names", &self.required_claim_names)
            .field("optional_claim_names", &self.optional_claim_names)
            .field("wrap_claim_name", &self.wrap_claim_name)
            .field("max_chain_length", &self.max_chain_length)
            .field("key_resolver", &self.key_resolver.as_ref().map(|_| "configured"))
            .finish()
    }
}
