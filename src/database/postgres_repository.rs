use sqlx::PgPool;

/// Repository over the relational side of the system (users and posts).
/// Constructed per request from the managed pool; cloning the pool is cheap.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
