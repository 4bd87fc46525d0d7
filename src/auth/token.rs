//! Bearer token codec and activation code generator.
//!
//! Bearer tokens are HS256 JWTs binding an account id under a process-wide
//! secret injected at startup. Activation codes are plain high-entropy
//! one-time values; they carry no structure and are matched against the
//! stored column.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: i32,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry_hours: Option<u64>,
}

impl TokenCodec {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is opt-in; without it tokens carry no exp claim at all.
        validation.validate_exp = config.expiry_hours.is_some();
        validation.required_spec_claims.clear();
        if config.expiry_hours.is_some() {
            validation.required_spec_claims.insert("exp".to_string());
        }

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expiry_hours: config.expiry_hours,
        }
    }

    /// Issue a signed bearer token bound to an account id.
    pub fn issue(&self, account_id: i32) -> Result<String, TokenError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            id: account_id,
            iat: now.timestamp(),
            exp: self.expiry_hours.map(|hours| {
                let lifetime = i64::try_from(hours).unwrap_or(i64::MAX).saturating_mul(3600);
                now.timestamp().saturating_add(lifetime)
            }),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a bearer token and return the bound account id. Tampered,
    /// malformed and (when enabled) expired tokens are all just invalid.
    pub fn verify(&self, token: &str) -> Result<i32, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.id)
            .map_err(|_| TokenError::Invalid)
    }
}

/// Generate a one-time activation code (32 character hex string).
#[must_use]
pub fn activation_code() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();

    bytes.iter().fold(String::with_capacity(32), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str, expiry_hours: Option<u64>) -> TokenCodec {
        TokenCodec::new(&TokenConfig {
            secret: secret.to_string(),
            expiry_hours,
        })
    }

    #[test]
    fn issue_then_verify_returns_bound_id() {
        let codec = codec("test-secret", None);
        let token = codec.issue(42).unwrap();

        assert_eq!(codec.verify(&token).unwrap(), 42);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec("test-secret", None);
        let token = codec.issue(42).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(codec.verify(&tampered).is_err());
        assert!(codec.verify("not-even-a-jwt").is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued = codec("first-secret", None).issue(42).unwrap();

        assert!(codec("second-secret", None).verify(&issued).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifying = codec("test-secret", Some(1));

        // Craft a token whose exp is already in the past.
        let claims = Claims {
            id: 42,
            iat: chrono::Utc::now().timestamp() - 7200,
            exp: Some(chrono::Utc::now().timestamp() - 3600),
        };
        let expired = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(verifying.verify(&expired).is_err());
    }

    #[test]
    fn activation_codes_are_unique_hex() {
        let first = activation_code();
        let second = activation_code();

        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
