//! Form login: checks a username/password pair without creating a session.

use crate::error::AppError;
use crate::model::Principal;
use crate::response::{ok, ErrorBody};
use crate::security::Credentials;
use crate::state::AppState;
use axum::{
    extract::{rejection::FormRejection, State},
    response::IntoResponse,
    Form,
};

/// Verify form credentials.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body(content = Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "OK", body = Principal),
        (status = 401, description = "Authentication failed", body = ErrorBody),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<Credentials>, FormRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Form(credentials) = form?;
    let principal = state
        .users
        .authenticate(&credentials.username, &credentials.password)
        .await?;
    tracing::info!(username = %principal.username, "form login");
    Ok(ok(principal))
}
