//! Signed, time-bounded credentials for the admin gate.
//!
//! A credential is `base64url(claims_json) "." base64url(hmac_sha256(secret, encoded_claims))`,
//! both halves unpadded. Issuing the same claims under the same secret always
//! yields the same string.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Separator between the claims and signature segments.
const SEPARATOR: char = '.';

/// Upper bound on accepted credential length, checked before any decoding.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Claims carried inside a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated subject (the admin username).
    pub subject: String,
    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiration (Unix timestamp, seconds). Exclusive.
    pub exp: i64,
}

impl Claims {
    /// Whether the credential is still valid at `now`.
    pub fn is_live_at(&self, now: i64) -> bool {
        now < self.exp
    }
}

/// Reasons a credential cannot be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed token: {0}")]
    Malformed(&'static str),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

impl TokenError {
    /// Short stable label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Configuration(_) => "configuration",
            TokenError::Malformed(_) => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::InvalidClaims(_) => "invalid_claims",
        }
    }
}

/// Issues and verifies credentials with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Option<Vec<u8>>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret_configured", &self.secret.is_some())
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec. An empty secret counts as no secret.
    pub fn new(secret: Option<&str>) -> Self {
        let secret = secret
            .filter(|s| !s.is_empty())
            .map(|s| s.as_bytes().to_vec());
        Self { secret }
    }

    /// Whether a signing secret is configured.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| TokenError::Configuration("no shared secret configured".to_string()))?;

        // HMAC accepts keys of any length
        HmacSha256::new_from_slice(secret)
            .map_err(|e| TokenError::Configuration(format!("unusable secret: {}", e)))
    }

    /// Issue a credential for `subject`, valid from `now` for `ttl_seconds`.
    pub fn issue(&self, subject: &str, now: i64, ttl_seconds: i64) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::InvalidClaims("subject must not be empty".to_string()));
        }
        if ttl_seconds <= 0 {
            return Err(TokenError::InvalidClaims(format!(
                "ttl must be positive, got {}",
                ttl_seconds
            )));
        }
        let exp = now
            .checked_add(ttl_seconds)
            .ok_or_else(|| TokenError::InvalidClaims("expiry overflows".to_string()))?;

        let mut mac = self.mac()?;

        let claims = Claims {
            subject: subject.to_string(),
            iat: now,
            exp,
        };
        let json = serde_json::to_vec(&claims)
            .map_err(|e| TokenError::InvalidClaims(format!("failed to serialize claims: {}", e)))?;
        let encoded_claims = URL_SAFE_NO_PAD.encode(json);

        mac.update(encoded_claims.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}{}{}", encoded_claims, SEPARATOR, signature))
    }

    /// Verify a credential at `now` and return its claims.
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::Malformed("token too long"));
        }

        let mut parts = token.split(SEPARATOR);
        let (encoded_claims, encoded_signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(s), None) if !c.is_empty() && !s.is_empty() => (c, s),
            _ => return Err(TokenError::Malformed("expected two non-empty segments")),
        };

        let mut mac = self.mac()?;
        mac.update(encoded_claims.as_bytes());

        let signature = URL_SAFE_NO_PAD
            .decode(encoded_signature)
            .map_err(|_| TokenError::InvalidSignature)?;
        // Constant-time over the full digest
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(encoded_claims)
            .map_err(|_| TokenError::Malformed("claims are not base64url"))?;
        let claims: Claims = serde_json::from_slice(&json)
            .map_err(|_| TokenError::Malformed("claims are not valid JSON"))?;

        if claims.subject.is_empty() {
            return Err(TokenError::Malformed("empty subject"));
        }
        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed("expiry precedes issue time"));
        }

        if !claims.is_live_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
