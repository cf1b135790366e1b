//! PostgreSQL adapters (sqlx) and table bootstrap.

use super::{missing_row, AnimeStore, UserLoginStore};
use crate::error::{AppError, ConfigError};
use crate::model::{Anime, Role, UserLogin};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const ANIME_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS anime (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
"#;

const USER_LOGIN_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS user_login (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        authorities TEXT NOT NULL DEFAULT ''
    )
"#;

/// Create `anime` and `user_login` if missing. Credentials are seeded out of band.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in [ANIME_DDL, USER_LOGIN_DDL] {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database if it does not exist.
/// A URL without a database name leaves the server default in place.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let target = DatabaseUrl::parse(database_url)?;
    let db_name = match target.database.as_deref() {
        None | Some("postgres") => return Ok(()),
        Some(name) => name,
    };
    let opts = sqlx::postgres::PgConnectOptions::from_str(&target.admin_url()).map_err(|_| {
        ConfigError::Invalid {
            key: "DATABASE_URL",
            value: database_url.to_string(),
        }
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// A connection URL split around its database path segment.
#[derive(Debug, PartialEq, Eq)]
struct DatabaseUrl<'a> {
    scheme: &'a str,
    authority: &'a str,
    database: Option<String>,
    query: Option<&'a str>,
}

impl<'a> DatabaseUrl<'a> {
    fn parse(url: &'a str) -> Result<Self, ConfigError> {
        let (scheme, rest) = url.split_once("://").ok_or_else(|| ConfigError::Invalid {
            key: "DATABASE_URL",
            value: url.to_string(),
        })?;
        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (rest, None),
        };
        let (authority, path) = location.split_once('/').unwrap_or((location, ""));
        let database = Some(path.trim().trim_end_matches('/'))
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(DatabaseUrl {
            scheme,
            authority,
            database,
            query,
        })
    }

    /// Same server and options, `postgres` maintenance database.
    fn admin_url(&self) -> String {
        match self.query {
            Some(query) => format!("{}://{}/postgres?{}", self.scheme, self.authority, query),
            None => format!("{}://{}/postgres", self.scheme, self.authority),
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Clone)]
pub struct PgAnimeStore {
    pool: PgPool,
}

impl PgAnimeStore {
    pub fn new(pool: PgPool) -> Self {
        PgAnimeStore { pool }
    }
}

#[async_trait]
impl AnimeStore for PgAnimeStore {
    fn find_all(&self) -> BoxStream<'_, Result<Anime, AppError>> {
        sqlx::query_as::<_, (i32, String)>("SELECT id, name FROM anime ORDER BY id")
            .fetch(&self.pool)
            .map_ok(|(id, name)| Anime { id: Some(id), name })
            .map_err(AppError::from)
            .boxed()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Anime>, AppError> {
        tracing::debug!(id, "select anime");
        let row: Option<(i32, String)> = sqlx::query_as("SELECT id, name FROM anime WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id, name)| Anime { id: Some(id), name }))
    }

    async fn save(&self, anime: Anime) -> Result<Anime, AppError> {
        let row: (i32, String) = match anime.id {
            None => {
                tracing::debug!(name = %anime.name, "insert anime");
                sqlx::query_as("INSERT INTO anime (name) VALUES ($1) RETURNING id, name")
                    .bind(&anime.name)
                    .fetch_one(&self.pool)
                    .await?
            }
            Some(id) => {
                tracing::debug!(id, name = %anime.name, "update anime");
                sqlx::query_as("UPDATE anime SET name = $2 WHERE id = $1 RETURNING id, name")
                    .bind(id)
                    .bind(&anime.name)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| missing_row(id))?
            }
        };
        Ok(Anime {
            id: Some(row.0),
            name: row.1,
        })
    }

    async fn delete(&self, anime: &Anime) -> Result<(), AppError> {
        let Some(id) = anime.id else {
            return Ok(());
        };
        tracing::debug!(id, "delete anime");
        sqlx::query("DELETE FROM anime WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserLoginStore {
    pool: PgPool,
}

impl PgUserLoginStore {
    pub fn new(pool: PgPool) -> Self {
        PgUserLoginStore { pool }
    }
}

#[async_trait]
impl UserLoginStore for PgUserLoginStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserLogin>, AppError> {
        let row: Option<(i32, String, String, String, String)> = sqlx::query_as(
            "SELECT id, name, username, password, authorities FROM user_login WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, name, username, password, authorities)| UserLogin {
            id,
            name,
            username,
            password,
            roles: Role::parse_list(&authorities),
        }))
    }
}
