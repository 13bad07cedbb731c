use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthError;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Verifies HS256 session tokens issued by the account service.
///
/// Token issuance lives elsewhere; `issue_token` exists for tooling and tests.
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue_token(&self, user_id: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            id: user_id.to_string(),
            role: None,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => {
                    debug!("Rejected session token: {}", e);
                    AuthError::InvalidToken
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates() {
        let service = SessionService::new(b"0123456789abcdef0123456789abcdef");
        let token = service.issue_token("u1", Duration::hours(1)).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.id, "u1");
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let service = SessionService::new(b"0123456789abcdef0123456789abcdef");
        let token = service.issue_token("u1", Duration::hours(-2)).unwrap();

        assert!(matches!(service.validate_token(&token), Err(AuthError::SessionExpired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issuer = SessionService::new(b"first-secret-first-secret-first!");
        let verifier = SessionService::new(b"other-secret-other-secret-other!");
        let token = issuer.issue_token("u1", Duration::hours(1)).unwrap();

        assert!(matches!(verifier.validate_token(&token), Err(AuthError::InvalidToken)));
    }
}
