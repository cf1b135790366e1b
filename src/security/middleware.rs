//! Per-request authentication and authorization.
//! Stateless: every request carries its own credentials.

use crate::error::AppError;
use crate::security::{basic_credentials, Access};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Resolve the route's [`Access`], authenticate the Basic credentials if
/// needed, check roles, and hand the [`crate::model::Principal`] to handlers
/// through request extensions.
pub async fn enforce_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = state.policy.access_for(request.method(), request.uri().path());
    if access == Access::Public {
        return Ok(next.run(request).await);
    }

    let credentials =
        basic_credentials(request.headers())?.ok_or_else(AppError::authentication_required)?;
    let principal = state
        .users
        .authenticate(&credentials.username, &credentials.password)
        .await?;

    if !access.permits(&principal) {
        tracing::info!(
            username = %principal.username,
            method = %request.method(),
            path = %request.uri().path(),
            required = %access,
            "access denied"
        );
        return Err(AppError::Forbidden("Access Denied".into()));
    }

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
