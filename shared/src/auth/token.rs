//! Session token codec.
//!
//! Issues and validates the signed, self-contained JWTs that carry a
//! session between the SSO server and the listings server. Signing keys
//! are never read from ambient process state: the codec asks an injected
//! `KeySource` for the secret of the issuing application.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::model::{App, User};
use crate::tool::error::AppError;

/// Claim set of a session token.
///
/// `uid` is the subject. It deserializes as an exact integer; a floating
/// or string representation fails decoding instead of being truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i64,
    pub email: String,
    pub app_id: i64,
    pub exp: i64,
}

/// Source of signing secrets, keyed by application id.
pub trait KeySource: Send + Sync {
    /// Returns the secret used to sign tokens of the given application,
    /// or `None` when the application is unknown to this source.
    fn signing_secret(&self, app_id: i64) -> Option<Vec<u8>>;
}

/// A single process-wide secret handed out for every application id.
///
/// This reproduces the deployed setup where all applications share one
/// secret from the environment. A store-backed source can replace it
/// without touching the codec.
pub struct FixedKey {
    secret: Vec<u8>,
}

impl FixedKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl KeySource for FixedKey {
    fn signing_secret(&self, _app_id: i64) -> Option<Vec<u8>> {
        Some(self.secret.clone())
    }
}

/// Creates and validates session tokens. Pure CPU work over its inputs
/// plus the injected key source; safe to share across requests.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<dyn KeySource>,
}

impl TokenCodec {
    pub fn new(keys: Arc<dyn KeySource>) -> Self {
        Self { keys }
    }

    /// Issues a token for `user` on behalf of `app`, expiring `ttl` from
    /// now. A key source that does not know the application is a server
    /// misconfiguration, not a client error.
    pub fn issue(&self, user: &User, app: &App, ttl: Duration) -> Result<String, AppError> {
        let secret = self
            .keys
            .signing_secret(app.id)
            .ok_or_else(|| AppError::Internal(format!("no signing secret for app {}", app.id)))?;

        let claims = Claims {
            uid: user.id,
            email: user.email.clone(),
            app_id: app.id,
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&secret),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Two-phase: the `app_id` claim is read first without trusting the
    /// signature, only to select the verification key; the token is then
    /// fully verified under that key with zero expiry leeway. Fails with
    /// `TokenExpired` past `exp` and `TokenInvalid` for everything else:
    /// bad signature, malformed structure, missing or wrongly-typed
    /// claims, or an application the key source does not know.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut peek = Validation::new(Algorithm::HS256);
        peek.insecure_disable_signature_validation();
        peek.validate_exp = false;
        peek.set_required_spec_claims::<&str>(&[]);

        let unverified = decode::<Claims>(token, &DecodingKey::from_secret(b""), &peek)
            .map_err(|_| AppError::TokenInvalid)?;

        let secret = self
            .keys
            .signing_secret(unverified.claims.app_id)
            .ok_or(AppError::TokenInvalid)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let verified = decode::<Claims>(token, &DecodingKey::from_secret(&secret), &validation)
            .map_err(map_jwt_error)?;

        Ok(verified.claims)
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> AppError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::TokenInvalid,
    }
}
