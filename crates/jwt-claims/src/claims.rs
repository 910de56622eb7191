//! Extracted claims and the validated claim set.

use crate::token::RawToken;
use crate::value::ClaimValue;
use serde::Serialize;
use std::collections::HashMap;

/// One claim found at one level of a token chain.
///
/// After merging, `inner` links to the same-named claim found one level
/// deeper, so the chain reads outer-to-inner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedClaim {
    pub name: String,
    pub value: ClaimValue,
    /// Issuer of the token level the claim was found in.
    pub issuer: String,
    /// Whether that level's signature was verified.
    pub verified: bool,
    /// Processing position of the level, 0 for the outermost token.
    pub depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner: Option<Box<ExtractedClaim>>,
}

impl ExtractedClaim {
    /// Claim as found in a single level, not yet linked to deeper levels.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: ClaimValue,
        issuer: impl Into<String>,
        verified: bool,
        depth: u32,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            issuer: issuer.into(),
            verified,
            depth,
            inner: None,
        }
    }

    #[must_use]
    pub fn inner_claim(&self) -> Option<&ExtractedClaim> {
        self.inner.as_deref()
    }

    /// Iterate this claim and all deeper same-named claims, outer first.
    pub fn chain(&self) -> impl Iterator<Item = &ExtractedClaim> {
        std::iter::successors(Some(self), |claim| claim.inner_claim())
    }

    /// Deepest same-named claim in the chain.
    #[must_use]
    pub fn innermost(&self) -> &ExtractedClaim {
        self.chain().last().unwrap_or(self)
    }
}

/// Validated result of one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    /// Merged claims by name; each holds its inner chain.
    pub claims: HashMap<String, ExtractedClaim>,
    /// Number of verified levels.
    pub verified_count: u32,
    /// The decoded outermost token.
    pub outer_token: RawToken,
}

impl ClaimSet {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExtractedClaim> {
        self.claims.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(String::as_str)
    }

    /// Whether at least one level of the chain was verified.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified_count > 0
    }
}
