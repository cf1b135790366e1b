//! Anime server. Uses PostgreSQL when `DATABASE_URL` is set, otherwise in-memory
//! stores seeded from `DEV_USERS`.

use anime_service::{
    app, ensure_database_exists, ensure_tables, AnimeStore, AppConfig, AppState, MemoryAnimeStore,
    MemoryUserLoginStore, PgAnimeStore, PgUserLoginStore, UserLoginStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEV_BCRYPT_COST: u32 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("anime_service=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    type Stores = (Arc<dyn AnimeStore>, Arc<dyn UserLoginStore>);
    let (animes, users): Stores = match &config.database_url {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            ensure_tables(&pool).await?;
            tracing::info!("using postgres stores");
            let animes: Arc<dyn AnimeStore> = Arc::new(PgAnimeStore::new(pool.clone()));
            let users: Arc<dyn UserLoginStore> = Arc::new(PgUserLoginStore::new(pool));
            (animes, users)
        }
        None => {
            let logins = config.dev_user_logins(DEV_BCRYPT_COST)?;
            tracing::warn!(users = logins.len(), "DATABASE_URL not set, using in-memory stores");
            let animes: Arc<dyn AnimeStore> = Arc::new(MemoryAnimeStore::new());
            let users: Arc<dyn UserLoginStore> = Arc::new(MemoryUserLoginStore::new(logins));
            (animes, users)
        }
    };

    let state = AppState::new(animes, users, config.expose_trace);
    for rule in state.policy.rules() {
        tracing::debug!(rule = %rule, "access rule");
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, config.body_limit_bytes)).await?;
    Ok(())
}
