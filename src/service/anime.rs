//! AnimeService: list, get, create, update, delete and batch create over an [`AnimeStore`].

use crate::error::AppError;
use crate::model::Anime;
use crate::service::RequestValidator;
use crate::store::AnimeStore;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;

fn not_found() -> AppError {
    AppError::NotFound("Anime not found".into())
}

#[derive(Clone)]
pub struct AnimeService {
    store: Arc<dyn AnimeStore>,
}

impl AnimeService {
    pub fn new(store: Arc<dyn AnimeStore>) -> Self {
        AnimeService { store }
    }

    pub fn store(&self) -> &Arc<dyn AnimeStore> {
        &self.store
    }

    pub fn find_all(&self) -> BoxStream<'_, Result<Anime, AppError>> {
        self.store.find_all()
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Anime, AppError> {
        self.store.find_by_id(id).await?.ok_or_else(not_found)
    }

    /// Callers validate first; see [`RequestValidator::validate`].
    pub async fn save(&self, anime: Anime) -> Result<Anime, AppError> {
        self.store.save(anime).await
    }

    /// Saves through one batch store call and checks each record as it is emitted.
    /// The first invalid record ends the stream with `InvalidArgument`; records
    /// emitted before it stay persisted and later ones are never saved.
    pub fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'_, Result<Anime, AppError>> {
        let saved = self.store.save_all(animes);
        stream::unfold(Some(saved), |state| async move {
            let mut saved = state?;
            let item = saved.next().await?;
            match item.and_then(|anime| RequestValidator::validate_saved(&anime).map(|_| anime)) {
                Ok(anime) => Some((Ok(anime), Some(saved))),
                Err(e) => Some((Err(e), None)),
            }
        })
        .boxed()
    }

    /// Overwrites every field of an existing record. The read and the write are not atomic.
    pub async fn update(&self, anime: Anime) -> Result<(), AppError> {
        let id = anime.id.ok_or_else(not_found)?;
        self.find_by_id(id).await?;
        self.store.save(anime).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let existing = self.find_by_id(id).await?;
        self.store.delete(&existing).await
    }
}
