//! Router assembly. Layer order, outermost first: request tracing, error
//! translation, body limit, access enforcement.

mod anime;
mod common;

pub use anime::{anime_routes, login_routes};
pub use common::common_routes;

use crate::error::AppError;
use crate::response::translate_errors;
use crate::security::enforce_access;
use crate::state::AppState;
use axum::{http::Uri, middleware, Router};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

async fn no_route(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(anime_routes())
        .merge(login_routes())
        .merge(common_routes())
        .fallback(no_route)
        .layer(middleware::from_fn_with_state(state.clone(), enforce_access))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), translate_errors)),
        )
        .with_state(state)
}
