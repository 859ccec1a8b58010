//! Access token issuance and verification (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::GatewayError;

/// Claims carried by an access token. `sub` is the username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
    pub fresh: bool,
}

/// Stateless issuer/verifier; the signing key is fixed at construction.
#[derive(Clone)]
pub struct TokenIssuer {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            ttl,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.jwt_secret_key, Duration::seconds(cfg.token_ttl_secs))
    }

    pub fn issue(&self, username: &str) -> Result<String, GatewayError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            token_type: "access".to_string(),
            fresh: false,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Check signature, expiry and `nbf`; return the username.
    pub fn verify(&self, token: &str) -> Result<String, GatewayError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        validation.leeway = 0;

        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            let msg = match e.kind() {
                ErrorKind::ExpiredSignature => "Token has expired",
                ErrorKind::InvalidSignature => "Signature verification failed",
                _ => "Invalid token",
            };
            GatewayError::Unauthorized(msg.to_string())
        })?;
        Ok(data.claims.sub)
    }
}
