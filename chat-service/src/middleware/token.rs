//! Bearer token claims and extraction

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Claims carried by every access token
///
/// Inserted into request extensions by [`JwtAuth`](super::JwtAuth) and read
/// by handlers through `Extension<Claims>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,

    /// User role, `ADMIN` or `USER`
    pub role: String,

    /// Organization the user belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Uuid>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Claims for `user_id`; timestamps and issuer are filled in when signed
    pub fn new(user_id: Uuid, role: impl Into<String>, org: Option<Uuid>) -> Self {
        Self {
            sub: user_id.to_string(),
            role: role.into(),
            org,
            exp: 0,
            iat: 0,
            iss: String::new(),
        }
    }

    /// The authenticated user's id
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Tenant used to scope filter queries
    pub fn organization_id(&self) -> Option<Uuid> {
        self.org
    }

    /// Check if the token has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// Token validator trait
pub trait TokenValidator: Send + Sync + Clone {
    /// Validate a token and extract claims
    fn validate_token(&self, token: &str) -> Result<Claims, Error>;
}

/// Extract the token from an `Authorization: Bearer` header
pub fn extract_token(headers: &HeaderMap) -> Result<String, Error> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("Missing Authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Unauthorized("Invalid Authorization header format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_claims_user_id() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "ADMIN", None);
        assert_eq!(claims.user_id(), Some(id));
        assert!(claims.has_role("ADMIN"));
        assert!(!claims.has_role("USER"));
    }

    #[test]
    fn test_org_omitted_when_absent() {
        let body = serde_json::to_value(Claims::new(Uuid::new_v4(), "USER", None)).unwrap();
        assert!(body.get("org").is_none());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_extract_rejects_missing_or_malformed() {
        let mut headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(Error::Unauthorized(_))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(extract_token(&headers), Err(Error::Unauthorized(_))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(extract_token(&headers), Err(Error::Unauthorized(_))));
    }
}
