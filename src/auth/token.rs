//! Stateless session claims, HS256-signed with the process-wide secret.
//!
//! Tokens carry the admin's username, email, and numeric id, and expire a
//! fixed window after issuance. There is no revocation: a token stays valid
//! until its natural expiry.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::User;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated admin.
    pub sub: String,
    pub email: String,
    /// Numeric user id. Re-validated against the users table on every
    /// request; the user may have been deleted after issuance.
    pub id: i64,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Issue a bearer token for `user`, valid for `minutes` from now.
pub fn issue(user: &User, secret: &str, minutes: i64) -> AppResult<TokenResponse> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.username.clone(),
        email: user.email.clone(),
        id: user.id_user,
        iat: now,
        exp: now + minutes * 60,
    };

    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
    })
}

/// Decode and check a bearer token. Fails on a bad signature, a malformed
/// token, or expiry; expiry gets its own message so callers can surface it.
pub fn verify(token: &str, secret: &str) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0; // no clock-skew allowance

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".to_string())
        }
        _ => AppError::Unauthorized("Invalid token".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id_user: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "unused".to_string(),
            description: None,
            photo_path: None,
            instagram_url: None,
            facebook_url: None,
            linkedin_url: None,
        }
    }

    #[test]
    fn issued_token_verifies_and_carries_claims() {
        let response = issue(&test_user(), "secret", 20).unwrap();
        assert_eq!(response.token_type, "bearer");

        let claims = verify(&response.access_token, "secret").unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.exp, claims.iat + 20 * 60);
    }

    #[test]
    fn wrong_secret_fails() {
        let response = issue(&test_user(), "secret", 20).unwrap();
        let err = verify(&response.access_token, "other-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn malformed_token_fails() {
        let err = verify("not-a-token", "secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_fails_with_expiry_message() {
        // Hand-roll claims already past their window.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".to_string(),
            email: "alice@example.com".to_string(),
            id: 7,
            iat: now - 30 * 60,
            exp: now - 10 * 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = verify(&token, "secret").unwrap_err();
        match err {
            AppError::Unauthorized(msg) => assert!(msg.contains("expired")),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn token_just_inside_window_verifies() {
        let response = issue(&test_user(), "secret", 1).unwrap();
        // Still within the 1-minute window
        assert!(verify(&response.access_token, "secret").is_ok());
    }
}
