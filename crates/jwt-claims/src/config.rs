//! Extractor configuration.
//!
//! Configuration is loaded from environment variables. The key resolver is
//! not configurable here; callers pass it to [`ExtractorConfig::into_policy`].

use crate::keys::KeyResolver;
use crate::policy::{VerificationPolicy, DEFAULT_MAX_CHAIN_LENGTH, DEFAULT_WRAP_CLAIM_NAME};
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::sync::Arc;
use thiserror::Error;

/// Maximum allowed leeway (10 minutes).
///
/// Prevents misconfiguration that would accept long-expired tokens.
pub const MAX_LEEWAY_SECONDS: u32 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid leeway configuration: {0}")]
    InvalidLeeway(String),

    #[error("Invalid wrap claim configuration: {0}")]
    InvalidWrapClaim(String),

    #[error("Invalid chain length configuration: {0}")]
    InvalidChainLength(String),
}

/// Extractor settings, everything in [`VerificationPolicy`] except the key
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Clock skew tolerance in seconds (default: 0).
    pub leeway_seconds: u32,

    /// Accepted audiences (default: any).
    pub audiences: BTreeSet<String>,

    /// Claims that must be present.
    pub required_claims: BTreeSet<String>,

    /// Claims extracted when present.
    pub optional_claims: BTreeSet<String>,

    /// Claim holding a wrapped token (default: "jwt").
    pub wrap_claim_name: String,

    /// Maximum number of chain levels (default: 16).
    pub max_chain_length: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            leeway_seconds: 0,
            audiences: BTreeSet::new(),
            required_claims: BTreeSet::new(),
            optional_claims: BTreeSet::new(),
            wrap_claim_name: DEFAULT_WRAP_CLAIM_NAME.to_string(),
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let leeway_seconds = if let Some(value_str) = vars.get("JWT_CLAIMS_LEEWAY_SECONDS") {
            let value: u32 = value_str.trim().parse().map_err(|e| {
                ConfigError::InvalidLeeway(format!(
                    "JWT_CLAIMS_LEEWAY_SECONDS must be a valid non-negative integer, got '{value_str}': {e}"
                ))
            })?;

            if value > MAX_LEEWAY_SECONDS {
                return Err(ConfigError::InvalidLeeway(format!(
                    "JWT_CLAIMS_LEEWAY_SECONDS must not exceed {MAX_LEEWAY_SECONDS} seconds, got {value}"
                )));
            }

            value
        } else {
            0
        };

        let wrap_claim_name = match vars.get("JWT_CLAIMS_WRAP_CLAIM") {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidWrapClaim(
                    "JWT_CLAIMS_WRAP_CLAIM must not be empty".to_string(),
                ));
            }
            Some(value) => value.trim().to_string(),
            None => DEFAULT_WRAP_CLAIM_NAME.to_string(),
        };

        let max_chain_length = if let Some(value_str) = vars.get("JWT_CLAIMS_MAX_CHAIN_LENGTH") {
            let value: u32 = value_str.trim().parse().map_err(|e| {
                ConfigError::InvalidChainLength(format!(
                    "JWT_CLAIMS_MAX_CHAIN_LENGTH must be a valid positive integer, got '{value_str}': {e}"
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidChainLength(
                    "JWT_CLAIMS_MAX_CHAIN_LENGTH must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_MAX_CHAIN_LENGTH
        };

        Ok(Self {
            leeway_seconds,
            audiences: parse_list(vars.get("JWT_CLAIMS_AUDIENCES")),
            required_claims: parse_list(vars.get("JWT_CLAIMS_REQUIRED")),
            optional_claims: parse_list(vars.get("JWT_CLAIMS_OPTIONAL")),
            wrap_claim_name,
            max_chain_length,
        })
    }

    /// Build the policy used by the extractor.
    #[must_use]
    pub fn into_policy(self, key_resolver: Option<Arc<dyn KeyResolver>>) -> VerificationPolicy {
        VerificationPolicy {
            leeway_seconds: self.leeway_seconds,
            audiences: self.audiences,
            required_claim_names: self.required_claims,
            optional_claim_names: self.optional_claims,
            wrap_claim_name: self.wrap_claim_name,
            max_chain_length: self.max_chain_length,
            key_resolver,
        }
    }
}

/// Comma-separated list; blank entries are dropped.
fn parse_list(value: Option<&String>) -> BTreeSet<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
