use crate::config::{DatabaseConfig, RedisConfig};
use redis::aio::ConnectionManager;
use rocket::fairing::AdHoc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

async fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&db_config.url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}

pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("Postgres (sqlx)", |rocket| async move {
        match init_pool(&db_config).await {
            Ok(pool) => {
                tracing::info!("Database pool initialized successfully");
                Ok(rocket.manage(pool))
            }
            Err(e) => {
                tracing::error!("Failed to initialize database pool: {}", e);
                Err(rocket)
            }
        }
    })
}

async fn init_redis(redis_config: &RedisConfig) -> Result<ConnectionManager, redis::RedisError> {
    let client = redis::Client::open(redis_config.url.as_str())?;
    client.get_connection_manager().await
}

pub fn stage_redis(redis_config: RedisConfig) -> AdHoc {
    AdHoc::try_on_ignite("Redis (connection manager)", |rocket| async move {
        match init_redis(&redis_config).await {
            Ok(manager) => {
                tracing::info!("Redis connection manager initialized successfully");
                Ok(rocket.manage(manager))
            }
            Err(e) => {
                tracing::error!("Failed to initialize Redis connection: {}", e);
                Err(rocket)
            }
        }
    })
}
