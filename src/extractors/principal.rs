//! Extract the authenticated caller placed in request extensions by the security layer.

use crate::error::AppError;
use crate::model::Principal;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The [`Principal`] of an authenticated request. Rejects with 401 on routes
/// the security layer let through without authentication.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(AppError::authentication_required)
    }
}
