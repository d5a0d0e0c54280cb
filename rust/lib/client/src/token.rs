//! Reading the claims segment of an access token without verifying it.
//!
//! The client never holds the signing key; it only needs `exp` to decide
//! whether a stored token is still worth sending.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has no payload segment")]
    Malformed,
    #[error("payload is not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The claims the client looks at. Unknown claims are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    /// Expiry, Unix seconds.
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(default)]
    pub sub: Option<String>,
}

impl Claims {
    /// A token without `exp` never expires.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now as f64)
    }
}

/// Decode the middle segment of `header.payload.signature`.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let payload = token.split('.').nth(1).ok_or(TokenError::Malformed)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
pub(crate) fn unsigned_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_exp_and_sub() {
        let token = unsigned_token(&json!({"sub": "alice", "exp": 1_700_000_000}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert!(claims.is_expired_at(1_700_000_001));
        assert!(!claims.is_expired_at(1_700_000_000));
        assert!(!claims.is_expired_at(1_600_000_000));
    }

    #[test]
    fn missing_exp_never_expires() {
        let token = unsigned_token(&json!({"sub": "alice"}));
        assert!(!decode_claims(&token).unwrap().is_expired_at(i64::MAX));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let token = unsigned_token(&json!({"exp": 1}));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1].push_str("==");
        assert!(decode_claims(&parts.join(".")).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_claims("opaque"), Err(TokenError::Malformed)));
        assert!(matches!(decode_claims("a.!!!.c"), Err(TokenError::Base64(_))));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("nope"));
        assert!(matches!(decode_claims(&not_json), Err(TokenError::Json(_))));
    }
}
