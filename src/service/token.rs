//! Stateless signed API tokens (HS256).
//!
//! A token embeds the user id, username, issue time and expiry. There is no
//! revocation list: a token stays valid until it expires.

use crate::auth::Identity;
use crate::config::TokenConfig;
use crate::error::app_error::AppError;
use crate::models::session::TokenClaims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Why a token was refused. Only ever logged; callers see `InvalidToken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    InvalidSignature,
    Expired,
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::InvalidToken
    }
}

#[derive(Clone)]
pub struct TokenAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenAuthenticator {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(config.secret.as_bytes(), Duration::hours(config.ttl_hours))
    }

    #[allow(clippy::result_large_err)]
    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        self.issue_at(identity, Utc::now())
    }

    #[allow(clippy::result_large_err)]
    pub fn issue_at(&self, identity: &Identity, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = TokenClaims {
            user_id: identity.user_id,
            username: identity.username.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| AppError::token_issue("Failed to sign token", e))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Signature first, then expiry: valid while `now < exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Identity {
            user_id: data.claims.user_id,
            username: data.claims.username,
        })
    }
}

/// Extract the token from an `Authorization` header value. Exactly
/// `Bearer <token>` is accepted: one space, no extra segments.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::Malformed)?;
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(TokenError::Malformed),
    }
}
