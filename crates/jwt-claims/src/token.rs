//! Compact JWT decoding.
//!
//! Decodes one level of a token chain into a [`RawToken`] without verifying
//! anything. The payload is parsed into a JSON tree owned by the token so
//! claims can be inspected by kind (see [`crate::value`]).
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - The compact form is held as a [`SecretString`] and never appears in
//!   `Debug` output
//! - Decoding failures are logged at debug level; the returned error is
//!   generic

use crate::error::{ClaimsError, DecodeFailure};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::fmt;

/// Maximum allowed size of one compact token in bytes (64KB).
///
/// Applies to every level of the chain. An outer token embeds its inner
/// tokens, so this is larger than a typical single-token limit.
pub const MAX_TOKEN_SIZE_BYTES: usize = 65_536;

/// Algorithm name of unsigned tokens.
pub const ALGORITHM_NONE: &str = "none";

/// One decoded level of a token chain.
#[derive(Clone)]
pub struct RawToken {
    header: Map<String, Value>,
    claims: Map<String, Value>,
    signature: Vec<u8>,
    algorithm: String,
    key_id: Option<String>,
    issuer: Option<String>,
    compact: SecretString,
}

impl RawToken {
    /// Declared signature algorithm (`alg` header).
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Whether the token declares itself unsigned.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.algorithm == ALGORITHM_NONE
    }

    /// Key id (`kid` header), if present and non-empty.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Issuer (`iss` claim), if present as a string.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Claim by name; JSON `null` counts as absent.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name).filter(|value| !value.is_null())
    }

    /// All payload claims.
    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Decoded JOSE header.
    #[must_use]
    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    /// Raw signature bytes, empty for unsigned tokens.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Original compact form, needed to re-verify the signature.
    #[must_use]
    pub fn compact(&self) -> &SecretString {
        &self.compact
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawToken")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field("issuer", &self.issuer)
            .field("claims", &self.claims.keys().collect::<Vec<_>>())
            .field("compact", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl PartialEq for RawToken {
    fn eq(&self, other: &Self) -> bool {
        self.compact.expose_secret() == other.compact.expose_secret()
    }
}

/// Decode a compact token string.
///
/// # Errors
///
/// - `ClaimsError::TokenTooLarge` - token exceeds [`MAX_TOKEN_SIZE_BYTES`]
/// - `ClaimsError::Decode` - wrong segment count, invalid base64url, invalid
///   or non-object JSON, or a header without `alg`
pub fn decode(token: &str) -> Result<RawToken, ClaimsError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "jwt_claims.token",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(ClaimsError::TokenTooLarge);
    }

    decode_parts(token).map_err(|e| {
        tracing::debug!(target: "jwt_claims.token", error = %e, "Failed to decode token");
        ClaimsError::Decode(e)
    })
}

fn decode_parts(token: &str) -> Result<RawToken, DecodeFailure> {
    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    let [header_part, payload_part, signature_part] = parts.as_slice() else {
        return Err(DecodeFailure::SegmentCount(parts.len()));
    };

    let header = decode_object(header_part, "header")?;
    let claims = decode_object(payload_part, "payload")?;
    let signature = URL_SAFE_NO_PAD.decode(signature_part)?;

    let algorithm = header
        .get("alg")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or(DecodeFailure::MissingAlgorithm)?;

    let key_id = header
        .get("kid")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    let issuer = claims
        .get("iss")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    Ok(RawToken {
        header,
        claims,
        signature,
        algorithm,
        key_id,
        issuer,
        compact: SecretString::from(token),
    })
}

fn decode_object(segment: &str, what: &'static str) -> Result<Map<String, Value>, DecodeFailure> {
    let bytes = URL_SAFE_NO_PAD.decode(segment)?;
    let value: Value = serde_json::from_slice(&bytes)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeFailure::NotAnObject(what)),
    }
}

/// Value of the wrapped-token claim, if present as a string.
///
/// Absent, `null` and non-string claims all yield `None`. Nothing is
/// verified here.
#[must_use]
pub fn wrapped_token(token: &RawToken, wrap_claim_name: &str) -> Option<String> {
    token
        .claim(wrap_claim_name)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn compact(header: &str, payload: &str) -> String {
        format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decode_unsigned_token() {
        let token = compact(
            r#"{"alg":"none","typ":"JWT"}"#,
            r#"{"iss":"<issuer>","scope":"read write"}"#,
        );

        let raw = decode(&token).unwrap();

        assert_eq!(raw.algorithm(), "none");
        assert!(raw.is_unsigned());
        assert_eq!(raw.issuer(), Some("<issuer>"));
        assert_eq!(raw.key_id(), None);
        assert_eq!(raw.claim("scope").and_then(Value::as_str), Some("read write"));
        assert!(raw.signature().is_empty());
        assert_eq!(raw.header().get("typ").and_then(Value::as_str), Some("JWT"));
        assert_eq!(raw.compact().expose_secret(), token);
    }

    #[test]
    fn test_decode_reads_kid() {
        let token = compact(r#"{"alg":"EdDSA","kid":"key-01"}"#, r#"{"iss":"i"}"#);
        assert_eq!(decode(&token).unwrap().key_id(), Some("key-01"));
    }

    #[test]
    fn test_decode_ignores_empty_kid() {
        let token = compact(r#"{"alg":"EdDSA","kid":""}"#, r#"{"iss":"i"}"#);
        assert_eq!(decode(&token).unwrap().key_id(), None);
    }

    #[test]
    fn test_decode_non_string_issuer_is_missing() {
        let token = compact(r#"{"alg":"none"}"#, r#"{"iss":42}"#);
        assert_eq!(decode(&token).unwrap().issuer(), None);
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        for token in ["<token>", "only.two", "a.b.c.d", ""] {
            let result = decode(token);
            assert!(
                matches!(result, Err(ClaimsError::Decode(DecodeFailure::SegmentCount(_)))),
                "expected segment count error for {token:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let result = decode("!!!invalid!!!.payload.");
        assert!(matches!(
            result,
            Err(ClaimsError::Decode(DecodeFailure::Base64(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let token = format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
            URL_SAFE_NO_PAD.encode("not-json")
        );
        assert!(matches!(
            decode(&token),
            Err(ClaimsError::Decode(DecodeFailure::Json(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_non_object_payload() {
        let token = compact(r#"{"alg":"none"}"#, "[1,2,3]");
        assert!(matches!(
            decode(&token),
            Err(ClaimsError::Decode(DecodeFailure::NotAnObject("payload")))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_algorithm() {
        let token = compact(r#"{"typ":"JWT"}"#, r#"{"iss":"i"}"#);
        assert!(matches!(
            decode(&token),
            Err(ClaimsError::Decode(DecodeFailure::MissingAlgorithm))
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_token() {
        let oversized = "a".repeat(MAX_TOKEN_SIZE_BYTES + 1);
        assert!(matches!(decode(&oversized), Err(ClaimsError::TokenTooLarge)));
    }

    #[test]
    fn test_decode_error_message_is_generic() {
        let err = decode("<token>").unwrap_err();
        assert_eq!(err.to_string(), "could not decode token");
    }

    #[test]
    fn test_wrapped_token_present() {
        let token = compact(r#"{"alg":"none"}"#, r#"{"jwt":"inner.token.value"}"#);
        let raw = decode(&token).unwrap();
        assert_eq!(
            wrapped_token(&raw, "jwt").as_deref(),
            Some("inner.token.value")
        );
    }

    #[test]
    fn test_wrapped_token_null_or_missing_or_non_string() {
        let null = decode(&compact(r#"{"alg":"none"}"#, r#"{"jwt":null}"#)).unwrap();
        let missing = decode(&compact(r#"{"alg":"none"}"#, r"{}")).unwrap();
        let number = decode(&compact(r#"{"alg":"none"}"#, r#"{"jwt":5}"#)).unwrap();

        assert_eq!(wrapped_token(&null, "jwt"), None);
        assert_eq!(wrapped_token(&missing, "jwt"), None);
        assert_eq!(wrapped_token(&number, "jwt"), None);
    }

    #[test]
    fn test_wrapped_token_uses_configured_claim_name() {
        let raw = decode(&compact(r#"{"alg":"none"}"#, r#"{"act":"x.y.z"}"#)).unwrap();
        assert_eq!(wrapped_token(&raw, "jwt"), None);
        assert_eq!(wrapped_token(&raw, "act").as_deref(), Some("x.y.z"));
    }

    #[test]
    fn test_debug_redacts_compact_form() {
        let token = compact(r#"{"alg":"none"}"#, r#"{"iss":"i","secret":"s3cr3t"}"#);
        let raw = decode(&token).unwrap();
        let debug = format!("{raw:?}");

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&token));
        assert!(!debug.contains("s3cr3t"));
    }
}
