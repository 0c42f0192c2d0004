use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use rusqlite::params;

use crate::auth::token;
use crate::db::models::{AdminDetails, User, USER_COLUMNS};
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated admin behind a bearer token.
///
/// Extraction verifies the token signature and expiry, then re-resolves the
/// claimed user id against the users table — the claim is caller-supplied
/// data and the account may have been deleted after issuance. All failure
/// modes (missing header, malformed or expired token, deleted user) map
/// uniformly to 401.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminDetails);

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = token::verify(token, &state.config.auth.jwt_secret)?;

        let conn = state.db.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id_user = ?1", USER_COLUMNS),
                params![claims.id],
                User::from_row,
            )
            .map_err(|_| AppError::Unauthorized("Unknown user".to_string()))?;

        Ok(CurrentAdmin(user.into()))
    }
}

fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
