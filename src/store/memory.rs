//! In-process adapters. Used by tests and by dev mode when no database is configured.

use super::{missing_row, AnimeStore, UserLoginStore};
use crate::error::AppError;
use crate::model::{Anime, UserLogin};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

fn poisoned() -> AppError {
    AppError::Internal("in-memory store lock poisoned".into())
}

struct AnimeTable {
    rows: BTreeMap<i32, Anime>,
    next_id: i32,
}

/// Anime table keyed by a sequential id starting at 1.
#[derive(Clone)]
pub struct MemoryAnimeStore {
    table: Arc<RwLock<AnimeTable>>,
}

impl Default for MemoryAnimeStore {
    fn default() -> Self {
        MemoryAnimeStore {
            table: Arc::new(RwLock::new(AnimeTable {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl MemoryAnimeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AnimeStore for MemoryAnimeStore {
    fn find_all(&self) -> BoxStream<'_, Result<Anime, AppError>> {
        match self.table.read() {
            Ok(table) => {
                let rows: Vec<Anime> = table.rows.values().cloned().collect();
                stream::iter(rows.into_iter().map(Ok)).boxed()
            }
            Err(_) => stream::once(async { Err(poisoned()) }).boxed(),
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Anime>, AppError> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn save(&self, anime: Anime) -> Result<Anime, AppError> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        let id = match anime.id {
            Some(id) if table.rows.contains_key(&id) => id,
            Some(id) => return Err(missing_row(id)),
            None => {
                let id = table.next_id;
                table.next_id += 1;
                id
            }
        };
        let saved = anime.with_id(id);
        table.rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, anime: &Anime) -> Result<(), AppError> {
        if let Some(id) = anime.id {
            self.table.write().map_err(|_| poisoned())?.rows.remove(&id);
        }
        Ok(())
    }
}

/// Credential entries keyed by username.
#[derive(Clone, Default)]
pub struct MemoryUserLoginStore {
    by_username: Arc<RwLock<HashMap<String, UserLogin>>>,
}

impl MemoryUserLoginStore {
    pub fn new(users: impl IntoIterator<Item = UserLogin>) -> Self {
        let by_username = users.into_iter().map(|u| (u.username.clone(), u)).collect();
        MemoryUserLoginStore {
            by_username: Arc::new(RwLock::new(by_username)),
        }
    }
}

#[async_trait]
impl UserLoginStore for MemoryUserLoginStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserLogin>, AppError> {
        let users = self.by_username.read().map_err(|_| poisoned())?;
        Ok(users.get(username).cloned())
    }
}
