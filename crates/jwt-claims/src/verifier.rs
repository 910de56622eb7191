//! Per-level signature verification.
//!
//! Decides whether one decoded token level is verified. Unsigned tokens and
//! policies without a key resolver yield `Ok(false)`; every other failure is
//! a hard error, never a silent "not verified".
//!
//! # Security
//!
//! - Only asymmetric algorithms are accepted; `HS*` is rejected so a public
//!   key can never be used as an HMAC secret
//! - The key family follows the token's declared algorithm, and the
//!   validation is pinned to that single algorithm
//! - Expiry, not-before and issued-at are checked with the policy leeway,
//!   capped at [`MAX_LEEWAY_SECONDS`]

use crate::config::MAX_LEEWAY_SECONDS;
use crate::error::{ClaimsError, VerificationFailure};
use crate::keys::{KeyResolver, PublicKey};
use crate::policy::VerificationPolicy;
use crate::token::RawToken;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::str::FromStr;

/// Verify one token level against `policy`.
///
/// # Returns
///
/// - `Ok(true)` - signature and claim checks passed
/// - `Ok(false)` - algorithm is `none`, or no key resolver is configured
///
/// # Errors
///
/// Returns `ClaimsError::Verification` when key resolution, signature,
/// expiry, not-before, issued-at or audience checks fail.
pub fn verify(token: &RawToken, policy: &VerificationPolicy) -> Result<bool, ClaimsError> {
    if token.is_unsigned() {
        tracing::debug!(target: "jwt_claims.verifier", "Unsigned token level, not verified");
        return Ok(false);
    }

    let Some(resolver) = policy.key_resolver.as_deref() else {
        return Ok(false);
    };

    verify_signed(token, resolver, policy)
        .map(|()| {
            tracing::debug!(
                target: "jwt_claims.verifier",
                alg = %token.algorithm(),
                kid = ?token.key_id(),
                "Token level verified"
            );
            true
        })
        .map_err(|e| {
            tracing::debug!(
                target: "jwt_claims.verifier",
                alg = %token.algorithm(),
                kid = ?token.key_id(),
                error = %e,
                "Token verification failed"
            );
            ClaimsError::Verification(e)
        })
}

fn verify_signed(
    token: &RawToken,
    resolver: &dyn KeyResolver,
    policy: &VerificationPolicy,
) -> Result<(), VerificationFailure> {
    let algorithm = Algorithm::from_str(token.algorithm())
        .map_err(|_| VerificationFailure::UnsupportedAlgorithm(token.algorithm().to_string()))?;

    // Reject symmetric algorithms before touching the key source
    if matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
        return Err(VerificationFailure::UnsupportedAlgorithm(
            token.algorithm().to_string(),
        ));
    }

    let key_id = token.key_id().ok_or(VerificationFailure::MissingKid)?;
    let public_key = resolver.resolve_public_key(key_id)?;
    let decoding_key = decoding_key(algorithm, &public_key)?;

    // jsonwebtoken computes `now - leeway` unchecked
    let leeway_seconds = policy.leeway_seconds.min(MAX_LEEWAY_SECONDS);

    let mut validation = Validation::new(algorithm);
    validation.leeway = u64::from(leeway_seconds);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // exp/nbf are checked when present, never required
    validation.required_spec_claims.clear();
    if policy.audiences.is_empty() {
        validation.validate_aud = false;
    } else {
        let audiences: Vec<&String> = policy.audiences.iter().collect();
        validation.set_audience(&audiences);
        validation.set_required_spec_claims(&["aud"]);
    }

    let data = jsonwebtoken::decode::<Value>(
        token.compact().expose_secret(),
        &decoding_key,
        &validation,
    )?;

    if let Some(iat) = data.claims.get("iat").and_then(Value::as_i64) {
        validate_iat_at(iat, leeway_seconds, chrono::Utc::now().timestamp())?;
    }

    Ok(())
}

fn decoding_key(
    algorithm: Algorithm,
    public_key: &PublicKey,
) -> Result<DecodingKey, VerificationFailure> {
    let bytes = public_key.as_bytes();
    match algorithm {
        Algorithm::EdDSA => Ok(DecodingKey::from_ed_der(bytes)),
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => Ok(DecodingKey::from_rsa_der(bytes)),
        Algorithm::ES256 | Algorithm::ES384 => Ok(DecodingKey::from_ec_der(bytes)),
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Err(
            VerificationFailure::UnsupportedAlgorithm(format!("{algorithm:?}")),
        ),
    }
}

/// Reject an `iat` more than `leeway_seconds` after `now`.
pub(crate) fn validate_iat_at(
    iat: i64,
    leeway_seconds: u32,
    now: i64,
) -> Result<(), VerificationFailure> {
    let max_iat = now.saturating_add(i64::from(leeway_seconds));

    if iat > max_iat {
        tracing::debug!(
            target: "jwt_claims.verifier",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        return Err(VerificationFailure::IatTooFarInFuture);
    }

    Ok(())
}
