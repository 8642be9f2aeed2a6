//! Access token generation
//!
//! Complements the [`JwtAuth`](crate::middleware::JwtAuth) validator: both
//! are built from the same [`JwtConfig`], so every issued token validates.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::config::JwtConfig;
use crate::error::Error;
use crate::middleware::Claims;

/// Token generation trait
pub trait TokenGenerator: Send + Sync + Clone {
    /// Sign `claims` with the default lifetime
    ///
    /// `exp`, `iat` and `iss` are overwritten by the generator.
    fn generate_token(&self, claims: &Claims) -> Result<String, Error>;

    /// Get the default token lifetime
    fn default_lifetime(&self) -> Duration;
}

/// HMAC signed JWT issuer
#[derive(Clone)]
pub struct JwtIssuer {
    encoding_key: Arc<EncodingKey>,
    algorithm: Algorithm,
    issuer: String,
    lifetime: Duration,
}

impl JwtIssuer {
    /// Create an issuer from configuration
    pub fn new(config: &JwtConfig) -> Result<Self, Error> {
        if config.secret.is_empty() {
            return Err(Error::Config(Box::new(figment::Error::from(
                "jwt.secret must be set (CHAT_JWT__SECRET)".to_string(),
            ))));
        }

        Ok(Self {
            encoding_key: Arc::new(EncodingKey::from_secret(config.secret.as_bytes())),
            algorithm: hmac_algorithm(&config.algorithm)?,
            issuer: config.issuer.clone(),
            lifetime: config.lifetime(),
        })
    }
}

impl TokenGenerator for JwtIssuer {
    fn generate_token(&self, claims: &Claims) -> Result<String, Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            exp: now + self.lifetime.as_secs() as i64,
            iat: now,
            iss: self.issuer.clone(),
            ..claims.clone()
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| Error::Jwt(Box::new(e)))
    }

    fn default_lifetime(&self) -> Duration {
        self.lifetime
    }
}

/// Parse a shared-secret algorithm name
pub(crate) fn hmac_algorithm(alg: &str) -> Result<Algorithm, Error> {
    match alg.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(Error::Config(Box::new(figment::Error::from(format!(
            "Unsupported JWT algorithm: {}",
            alg
        ))))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            algorithm: "HS256".to_string(),
            issuer: "Chat-App-Server".to_string(),
            expiry_hours: 1,
        }
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let mut config = config();
        config.secret.clear();
        assert!(matches!(JwtIssuer::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_asymmetric_algorithms_are_rejected() {
        assert!(hmac_algorithm("RS256").is_err());
        assert_eq!(hmac_algorithm("hs512").unwrap(), Algorithm::HS512);
    }

    #[test]
    fn test_generated_token_has_three_segments() {
        let issuer = JwtIssuer::new(&config()).unwrap();
        let token = issuer
            .generate_token(&Claims::new(Uuid::new_v4(), "USER", None))
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(issuer.default_lifetime(), Duration::from_secs(3600));
    }
}
