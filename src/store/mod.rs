//! Store ports and their adapters. Services only see the traits below.

mod memory;
mod postgres;

pub use memory::{MemoryAnimeStore, MemoryUserLoginStore};
pub use postgres::{ensure_database_exists, ensure_tables, PgAnimeStore, PgUserLoginStore};

use crate::error::AppError;
use crate::model::{Anime, UserLogin};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

/// Record store for anime rows.
#[async_trait]
pub trait AnimeStore: Send + Sync {
    /// All rows in id order.
    fn find_all(&self) -> BoxStream<'_, Result<Anime, AppError>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Anime>, AppError>;

    /// Insert when `id` is absent, otherwise overwrite the existing row.
    /// Saving an id that is not stored is an error.
    async fn save(&self, anime: Anime) -> Result<Anime, AppError>;

    /// Saves lazily, one row per poll. Dropping the stream stops further saves.
    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'_, Result<Anime, AppError>> {
        stream::iter(animes).then(move |anime| self.save(anime)).boxed()
    }

    /// Removes the row with the entity's id. An entity without id is a no-op.
    async fn delete(&self, anime: &Anime) -> Result<(), AppError>;

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Credential store. Entries are pre-seeded; this service never writes them.
#[async_trait]
pub trait UserLoginStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserLogin>, AppError>;
}

pub(crate) fn missing_row(id: i32) -> AppError {
    AppError::Internal(format!("failed to update table anime: row with id {} does not exist", id))
}
