//! Bearer-token identity resolution for authenticated routes.

use crate::error::ApiError;
use crate::state::AppState;
use agroguard_store::Account;
use axum::http::{HeaderMap, header};
use log::debug;

/// Resolve the calling account from the `Authorization` header.
///
/// Missing header, wrong scheme, malformed value, and invalid/expired token
/// each fail with 401 before any side effect; a valid token whose account no
/// longer exists fails with 404.
pub fn current_account(state: &AppState, headers: &HeaderMap) -> Result<Account, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthenticated("Authorization header missing".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthenticated("Invalid authorization header".to_string()))?;

    let mut parts = value.split_whitespace();
    let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => {
            return Err(ApiError::Unauthenticated(
                "Invalid authorization header".to_string(),
            ));
        }
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::Unauthenticated(
            "Invalid authentication scheme".to_string(),
        ));
    }

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".to_string()))?;
    let account = state
        .db
        .account_by_id(claims.sub)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    debug!("authenticated request (account_id={})", account.id);
    Ok(account)
}
