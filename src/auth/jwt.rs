use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::ResetClaims;
use crate::{
    config::{JwtConfig, MAX_RESET_TTL_MINUTES},
    state::AppState,
};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed or has a bad signature")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signing material for password-reset tokens, derived once from config.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    reset_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let ttl_minutes = cfg.reset_ttl_minutes.clamp(1, MAX_RESET_TTL_MINUTES) as u64;
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            reset_ttl: Duration::from_secs(ttl_minutes * 60),
        }
    }

    /// Issues a reset token bound to `user_id`.
    pub fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    /// Issues a token as if at `now`; it expires one reset TTL later.
    pub fn issue_at(&self, user_id: i32, now: OffsetDateTime) -> Result<String, TokenError> {
        let exp = now + TimeDuration::seconds(self.reset_ttl.as_secs() as i64);
        let claims = ResetClaims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };
        let token = self.sign(&claims)?;
        debug!(user_id, jti = %claims.jti, "reset token issued");
        Ok(token)
    }

    fn sign(&self, claims: &ResetClaims) -> Result<String, TokenError> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    /// Returns the user id bound to `token`.
    pub fn verify(&self, token: &str) -> Result<i32, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<ResetClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        debug!(user_id = data.claims.sub, jti = %data.claims.jti, "reset token verified");
        Ok(data.claims.sub)
    }
}
