use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::services::identity::Identity;
use crate::state::AppState;

/// Resolve the caller's identity from the Authorization bearer token.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(AppError::Unauthorized(
            "Authentication required.".to_string(),
        ));
    }

    match state.identity.verify_token(token).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(AppError::Unauthorized(
            "Authentication required.".to_string(),
        )),
        Err(e) => Err(AppError::Identity(e.to_string())),
    }
}

pub fn require_admin(identity: &Identity) -> Result<(), AppError> {
    if identity.role.as_deref() == Some("admin") {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Access denied: Insufficient permissions.".to_string(),
        ))
    }
}
