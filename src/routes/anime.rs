//! Anime CRUD routes and form login.

use crate::handlers::anime::{
    delete as delete_handler, find_by_id, list_all, save, save_batch, update,
};
use crate::handlers::auth::login;
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn anime_routes() -> Router<AppState> {
    Router::new()
        .route("/animes", get(list_all).post(save))
        .route("/animes/batch", post(save_batch))
        .route("/animes/:id", get(find_by_id).put(update).delete(delete_handler))
}

pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
