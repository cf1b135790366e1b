//! Shared application state for all routes.

use crate::security::AccessPolicy;
use crate::service::{AnimeService, UserLoginService};
use crate::store::{AnimeStore, UserLoginStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub animes: AnimeService,
    pub users: UserLoginService,
    pub policy: Arc<AccessPolicy>,
    /// Honour `?trace=true` on error responses.
    pub expose_trace: bool,
}

impl AppState {
    /// State with the standard access policy over the given stores.
    pub fn new(
        animes: Arc<dyn AnimeStore>,
        users: Arc<dyn UserLoginStore>,
        expose_trace: bool,
    ) -> Self {
        AppState {
            animes: AnimeService::new(animes),
            users: UserLoginService::new(users),
            policy: Arc::new(AccessPolicy::standard()),
            expose_trace,
        }
    }
}
