//! Anime CRUD handlers: list, read, create, batch create, update, delete.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::model::Anime;
use crate::response::{created, ok, ErrorBody};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;

/// List all animes.
#[utoipa::path(
    get,
    path = "/animes",
    tag = "anime",
    responses(
        (status = 200, description = "All animes in store order", body = [Anime]),
        (status = 401, description = "Authentication failed", body = ErrorBody),
    ),
    security(("basicAuth" = []))
)]
pub async fn list_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let animes: Vec<Anime> = state.animes.find_all().try_collect().await?;
    Ok(ok(animes))
}

/// Find an anime by id.
#[utoipa::path(
    get,
    path = "/animes/{id}",
    tag = "anime",
    params(("id" = i32, Path, description = "Anime id")),
    responses(
        (status = 200, description = "OK", body = Anime),
        (status = 404, description = "Anime not found", body = ErrorBody),
    ),
    security(("basicAuth" = []))
)]
pub async fn find_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let anime = state.animes.find_by_id(id).await?;
    Ok(ok(anime))
}

/// Create an anime.
///
/// Any id in the body is ignored; the store assigns one.
#[utoipa::path(
    post,
    path = "/animes",
    tag = "anime",
    request_body = Anime,
    responses(
        (status = 201, description = "Created", body = Anime),
        (status = 400, description = "Invalid argument", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("basicAuth" = []))
)]
pub async fn save(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<Anime>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(anime) = body?;
    RequestValidator::validate(&anime)?;
    let saved = state.animes.save(Anime { id: None, ..anime }).await?;
    tracing::info!(username = %user.username, id = ?saved.id, "anime created");
    Ok(created(saved))
}

/// Create a list of animes.
///
/// Records are saved one by one; a record with an empty name fails the whole
/// response with 400 but the records saved before it remain.
#[utoipa::path(
    post,
    path = "/animes/batch",
    tag = "anime",
    request_body = [Anime],
    responses(
        (status = 201, description = "Created", body = [Anime]),
        (status = 400, description = "Invalid argument", body = ErrorBody),
    ),
    security(("basicAuth" = []))
)]
pub async fn save_batch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<Vec<Anime>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(animes) = body?;
    let animes = animes.into_iter().map(|a| Anime { id: None, ..a }).collect();
    let saved: Vec<Anime> = state.animes.save_all(animes).try_collect().await?;
    tracing::info!(username = %user.username, count = saved.len(), "animes created");
    Ok(created(saved))
}

/// Update an anime.
///
/// The id in the path wins over any id in the body.
#[utoipa::path(
    put,
    path = "/animes/{id}",
    tag = "anime",
    params(("id" = i32, Path, description = "Anime id")),
    request_body = Anime,
    responses(
        (status = 204, description = "No content"),
        (status = 400, description = "Invalid argument", body = ErrorBody),
        (status = 404, description = "Anime not found", body = ErrorBody),
    ),
    security(("basicAuth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<Anime>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(anime) = body?;
    let anime = anime.with_id(id);
    RequestValidator::validate(&anime)?;
    state.animes.update(anime).await?;
    tracing::info!(username = %user.username, id, "anime updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an anime.
#[utoipa::path(
    delete,
    path = "/animes/{id}",
    tag = "anime",
    params(("id" = i32, Path, description = "Anime id")),
    responses(
        (status = 204, description = "No content"),
        (status = 404, description = "Anime not found", body = ErrorBody),
    ),
    security(("basicAuth" = []))
)]
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    state.animes.delete(id).await?;
    tracing::info!(username = %user.username, id, "anime deleted");
    Ok(StatusCode::NO_CONTENT)
}
