//! Security invariants over an extraction result.

use crate::claims::ExtractedClaim;
use crate::error::ClaimsError;
use std::collections::{BTreeSet, HashMap};

/// Checks that a chain was signed somewhere and carries all required claims.
#[derive(Debug, Clone)]
pub struct RequiredClaimsValidator {
    required_claim_names: BTreeSet<String>,
}

impl RequiredClaimsValidator {
    #[must_use]
    pub fn new(required_claim_names: BTreeSet<String>) -> Self {
        Self {
            required_claim_names,
        }
    }

    /// Only meaningful when a key resolver is configured; the caller decides.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::MissingSignature` if no level was verified.
    pub fn ensure_at_least_one_verified(&self, verified_count: u32) -> Result<(), ClaimsError> {
        if verified_count == 0 {
            tracing::debug!(target: "jwt_claims.extractor", "Token rejected: no verified level");
            return Err(ClaimsError::MissingSignature);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ClaimsError::MissingClaim` naming every required claim not
    /// present in `claims`, sorted.
    pub fn ensure_required_present(
        &self,
        claims: &HashMap<String, ExtractedClaim>,
    ) -> Result<(), ClaimsError> {
        let missing: Vec<String> = self
            .required_claim_names
            .iter()
            .filter(|name| !claims.contains_key(name.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            target: "jwt_claims.extractor",
            missing = ?missing,
            "Token rejected: required claims missing"
        );
        Err(ClaimsError::MissingClaim { missing })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::value::ClaimValue;

    fn validator(names: &[&str]) -> RequiredClaimsValidator {
        RequiredClaimsValidator::new(names.iter().map(ToString::to_string).collect())
    }

    fn present(names: &[&str]) -> HashMap<String, ExtractedClaim> {
        names
            .iter()
            .map(|n| {
                (
                    (*n).to_string(),
                    ExtractedClaim::new(*n, ClaimValue::Boolean(true), "iss", true, 0),
                )
            })
            .collect()
    }

    #[test]
    fn test_zero_verified_levels_is_rejected() {
        let err = validator(&[]).ensure_at_least_one_verified(0).unwrap_err();
        assert!(matches!(err, ClaimsError::MissingSignature));
        assert_eq!(err.to_string(), "at least one part of the token should be signed");
    }

    #[test]
    fn test_one_verified_level_is_enough() {
        assert!(validator(&[]).ensure_at_least_one_verified(1).is_ok());
    }

    #[test]
    fn test_all_required_present() {
        let claims = present(&["foo", "scope", "extra"]);
        assert!(validator(&["foo", "scope"]).ensure_required_present(&claims).is_ok());
    }

    #[test]
    fn test_missing_required_claim_is_named() {
        let err = validator(&["foo"])
            .ensure_required_present(&present(&["scope"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required claim(s): foo");
    }

    #[test]
    fn test_multiple_missing_claims_are_sorted() {
        let err = validator(&["zeta", "alpha", "scope"])
            .ensure_required_present(&present(&["scope"]))
            .unwrap_err();

        assert!(matches!(
            &err,
            ClaimsError::MissingClaim { missing } if missing == &["alpha", "zeta"]
        ));
        assert_eq!(err.to_string(), "missing required claim(s): alpha, zeta");
    }

    #[test]
    fn test_no_required_claims() {
        assert!(validator(&[]).ensure_required_present(&HashMap::new()).is_ok());
    }
}
