//! Access and refresh tokens.
//!
//! Both kinds are HS256 JWTs. Each carries the generation it was issued
//! under; bumping a kind's generation invalidates every token of that kind
//! issued before, without waiting for `exp`.

use std::sync::atomic::{AtomicU64, Ordering};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub uid: i64,
    pub kind: TokenKind,
    pub generation: u64,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is invalid or expired")]
    Invalid,
    #[error("wrong token type")]
    WrongKind,
    #[error("token has been revoked")]
    Revoked,
    #[error("jwt encode: {0}")]
    Encode(String),
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: i64,
    refresh_ttl: i64,
    access_generation: AtomicU64,
    refresh_generation: AtomicU64,
}

pub const DEV_SECRET: &str = "catalog-dev-jwt-secret";

impl JwtService {
    /// TTLs are in seconds. A negative access TTL issues tokens that are
    /// already expired.
    pub fn new(secret: &str, access_ttl: i64, refresh_ttl: i64) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
            access_generation: AtomicU64::new(0),
            refresh_generation: AtomicU64::new(0),
        }
    }

    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn issue(&self, kind: TokenKind, username: &str, uid: i64) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let (ttl, generation) = match kind {
            TokenKind::Access => (self.access_ttl, &self.access_generation),
            TokenKind::Refresh => (self.refresh_ttl, &self.refresh_generation),
        };
        let claims = Claims {
            sub: username.to_string(),
            uid,
            kind,
            generation: generation.load(Ordering::SeqCst),
            iat: now,
            exp: now + ttl,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)?;
        if claims.kind != kind {
            return Err(TokenError::WrongKind);
        }
        let current = match kind {
            TokenKind::Access => self.access_generation.load(Ordering::SeqCst),
            TokenKind::Refresh => self.refresh_generation.load(Ordering::SeqCst),
        };
        if claims.generation < current {
            return Err(TokenError::Revoked);
        }
        Ok(claims)
    }

    /// Reject every access token issued so far.
    pub fn expire_access_tokens(&self) {
        self.access_generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Reject every refresh token issued so far.
    pub fn revoke_refresh_tokens(&self) {
        self.refresh_generation.fetch_add(1, Ordering::SeqCst);
    }
}
