//! HS256 token issue and verification.
//!
//! All three token flavours (access, refresh, reset) share one claims shape;
//! nothing in the payload records what a token was issued for, only how long
//! it lives.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::role::Role;
use crate::domain::user::UserId;

/// Seconds an access token stays valid.
const ACCESS_TTL_SECS: i64 = 15 * 60;
/// Seconds a refresh token stays valid.
const REFRESH_TTL_SECS: i64 = 14 * 24 * 60 * 60;
/// Seconds a password-reset token stays valid.
const RESET_TTL_SECS: i64 = 24 * 60 * 60;

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub sub: i64,
    /// Role held when the token was issued.
    pub role: Role,
    /// Issue time, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Subject as a typed user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from(self.sub)
    }
}

/// Token signing and verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Signature, structure, or algorithm defect.
    #[error("token is invalid")]
    Invalid,
    /// Correctly signed but past its expiry.
    #[error("token has expired")]
    Expired,
    /// The claims could not be signed at issue time.
    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Signs and verifies bearer tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build a service around the shared signing secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a 15 minute access token.
    pub fn issue_access(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        self.issue(user_id, role, ACCESS_TTL_SECS)
    }

    /// Issue a 14 day refresh token.
    pub fn issue_refresh(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        self.issue(user_id, role, REFRESH_TTL_SECS)
    }

    /// Issue a 24 hour password-reset token.
    pub fn issue_reset(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        self.issue(user_id, role, RESET_TTL_SECS)
    }

    fn issue(&self, user_id: UserId, role: Role, ttl_secs: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.get(),
            role,
            iat: now,
            exp: now + ttl_secs,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| TokenError::Signing(error.to_string()))
    }

    /// Verify signature and expiry and return the embedded claims.
    ///
    /// Expired-but-otherwise-valid tokens report [`TokenError::Expired`];
    /// every other defect reports [`TokenError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| match error.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

/// Replace the JWT section separator `.` with `+` so the token can ride in a
/// reset URL path segment.
///
/// Base64url never emits `+`, so [`from_url_form`] is an exact inverse and a
/// no-op on tokens arriving in canonical form.
#[must_use]
pub fn to_url_form(token: &str) -> String {
    token.replace('.', "+")
}

/// Reverse [`to_url_form`] before verification.
#[must_use]
pub fn from_url_form(token: &str) -> String {
    token.replace('+', ".")
}
