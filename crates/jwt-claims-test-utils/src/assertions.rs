//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for extracted claims.

use jwt_claims::{ClaimSet, ClaimValue, ExtractedClaim};

/// Custom assertions for a single extracted claim
///
/// # Example
/// ```rust,ignore
/// claims
///     .expect_claim("scope")
///     .assert_str("test test2")
///     .assert_unverified()
///     .expect_inner()
///     .assert_verified()
///     .assert_depth(1);
/// ```
pub trait ClaimAssertions {
    /// Assert the claim value
    fn assert_value(&self, expected: &ClaimValue) -> &Self;

    /// Assert the claim is a string equal to `expected`
    fn assert_str(&self, expected: &str) -> &Self;

    /// Assert the claim's level was verified
    fn assert_verified(&self) -> &Self;

    /// Assert the claim's level was not verified
    fn assert_unverified(&self) -> &Self;

    /// Assert the processing depth of the claim's level
    fn assert_depth(&self, depth: u32) -> &Self;

    /// Assert the issuer of the claim's level
    fn assert_issuer(&self, issuer: &str) -> &Self;

    /// Assert the claim has no deeper same-named claim
    fn assert_no_inner(&self) -> &Self;

    /// Return the next deeper same-named claim, failing if there is none
    fn expect_inner(&self) -> &ExtractedClaim;
}

impl ClaimAssertions for ExtractedClaim {
    fn assert_value(&self, expected: &ClaimValue) -> &Self {
        assert_eq!(
            &self.value, expected,
            "Claim '{}' at depth {} has unexpected value",
            self.name, self.depth
        );
        self
    }

    fn assert_str(&self, expected: &str) -> &Self {
        assert_eq!(
            self.value.as_str(),
            Some(expected),
            "Claim '{}' at depth {}: expected string '{}', got {:?}",
            self.name,
            self.depth,
            expected,
            self.value
        );
        self
    }

    fn assert_verified(&self) -> &Self {
        assert!(
            self.verified,
            "Claim '{}' at depth {} should come from a verified level",
            self.name, self.depth
        );
        self
    }

    fn assert_unverified(&self) -> &Self {
        assert!(
            !self.verified,
            "Claim '{}' at depth {} should come from an unverified level",
            self.name, self.depth
        );
        self
    }

    fn assert_depth(&self, depth: u32) -> &Self {
        assert_eq!(
            self.depth, depth,
            "Claim '{}': expected depth {}, got {}",
            self.name, depth, self.depth
        );
        self
    }

    fn assert_issuer(&self, issuer: &str) -> &Self {
        assert_eq!(
            self.issuer, issuer,
            "Claim '{}' at depth {}: expected issuer '{}', got '{}'",
            self.name, self.depth, issuer, self.issuer
        );
        self
    }

    fn assert_no_inner(&self) -> &Self {
        assert!(
            self.inner.is_none(),
            "Claim '{}' at depth {} should have no inner claim",
            self.name,
            self.depth
        );
        self
    }

    fn expect_inner(&self) -> &ExtractedClaim {
        self.inner_claim().unwrap_or_else(|| {
            panic!(
                "Claim '{}' at depth {} has no inner claim",
                self.name, self.depth
            )
        })
    }
}

/// Custom assertions for a claim set
pub trait ClaimSetAssertions {
    /// Return the named claim, failing if it was not extracted
    fn expect_claim(&self, name: &str) -> &ExtractedClaim;

    /// Assert the named claim was not extracted
    fn assert_no_claim(&self, name: &str) -> &Self;

    /// Assert the number of verified levels
    fn assert_verified_count(&self, count: u32) -> &Self;
}

impl ClaimSetAssertions for ClaimSet {
    fn expect_claim(&self, name: &str) -> &ExtractedClaim {
        self.get(name).unwrap_or_else(|| {
            let mut names: Vec<&str> = self.names().collect();
            names.sort_unstable();
            panic!("Claim '{}' not extracted. Available claims: {:?}", name, names)
        })
    }

    fn assert_no_claim(&self, name: &str) -> &Self {
        assert!(
            self.get(name).is_none(),
            "Claim '{}' should not have been extracted",
            name
        );
        self
    }

    fn assert_verified_count(&self, count: u32) -> &Self {
        assert_eq!(
            self.verified_count, count,
            "Expected {} verified levels, got {}",
            count, self.verified_count
        );
        self
    }
}
