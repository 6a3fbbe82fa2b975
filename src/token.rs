//! Bearer token issuance and verification.
//!
//! ## Purpose
//!
//! Write routes are protected by short-lived HS256 JWTs. A token carries a
//! single `exp` claim and nothing else.
//!
//! ## Expiration
//!
//! [`TokenAuthority::verify`] checks the signature only. Comparing the
//! returned `exp` against the clock is left to the caller, so the same
//! authority can serve callers with different staleness policies.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Message reported for a missing or malformed `Authorization` header.
pub const MALFORMED_CREDENTIAL: &str = "Missing or malformed JWT";

/// Message reported for a token that fails verification.
pub const INVALID_CREDENTIAL: &str = "Invalid or expired JWT";

const BEARER_SCHEME: &str = "bearer ";

/// Decoded claim set of a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Whether the claim has expired at `now` (seconds since epoch).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}

/// Token authority errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Header missing, not a bearer credential, or empty token.
    #[error("{}", MALFORMED_CREDENTIAL)]
    MalformedCredential,
    /// Signature invalid or token undecodable.
    #[error("{}", INVALID_CREDENTIAL)]
    Invalid(#[source] jsonwebtoken::errors::Error),
    /// Signing failed.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    /// The configured lifetime pushes `exp` past the representable clock.
    #[error("token lifetime of {0} minutes is out of range")]
    LifetimeOutOfRange(i64),
}

impl TokenError {
    /// Whether the presented credential was structurally malformed.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedCredential)
    }
}

/// Issues and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_minutes: i64,
}

impl TokenAuthority {
    /// Create an authority from a shared secret and a token lifetime in minutes.
    pub fn new(secret: &[u8], lifetime_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime_minutes,
        }
    }

    /// Configured token lifetime in minutes.
    pub fn lifetime_minutes(&self) -> i64 {
        self.lifetime_minutes
    }

    /// Issue a token expiring one lifetime from now.
    pub fn issue(&self) -> Result<String, TokenError> {
        self.issue_at(Utc::now())
    }

    /// Issue a token expiring one lifetime after `now`.
    ///
    /// Fails with [`TokenError::LifetimeOutOfRange`] when the expiry cannot
    /// be represented.
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = Duration::try_minutes(self.lifetime_minutes)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenError::LifetimeOutOfRange(self.lifetime_minutes))?;
        let claims = TokenClaims {
            exp: expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify a bare token's signature and return its claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }

    /// Verify an `Authorization` header value of the form `Bearer <token>`.
    pub fn verify_bearer(&self, header: &str) -> Result<TokenClaims, TokenError> {
        let token = extract_bearer(header).ok_or(TokenError::MalformedCredential)?;
        self.verify(token)
    }
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("lifetime_minutes", &self.lifetime_minutes)
            .finish_non_exhaustive()
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let header = header.trim();
    let scheme = header.get(..BEARER_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = header[BEARER_SCHEME.len()..].trim();
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}
