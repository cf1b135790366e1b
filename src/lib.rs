//! Anime service: role-protected REST CRUD for anime records.

pub mod config;
pub mod doc;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod security;
pub mod service;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError, ErrorKind};
pub use model::{Anime, Principal, Role, UserLogin};
pub use routes::app;
pub use service::{AnimeService, UserLoginService};
pub use state::AppState;
pub use store::{
    ensure_database_exists, ensure_tables, AnimeStore, MemoryAnimeStore, MemoryUserLoginStore,
    PgAnimeStore, PgUserLoginStore, UserLoginStore,
};
