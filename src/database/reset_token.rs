use crate::error::app_error::AppError;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;
use uuid::Uuid;

pub const FORGET_PASSWORD_PREFIX: &str = "forget-password:";

/// One-time, time-limited credential enabling password change without a
/// prior session. Redis expires the entry when the TTL lapses; a successful
/// password change revokes it early.
#[async_trait::async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn issue(&self, user_id: i32, ttl: Duration) -> Result<Uuid, AppError>;
    /// Tokens arrive from the outside as arbitrary strings; an unknown or
    /// expired token resolves to `None`.
    async fn resolve(&self, token: &str) -> Result<Option<i32>, AppError>;
    async fn revoke(&self, token: &str) -> Result<(), AppError>;
}

pub struct RedisResetTokenStore {
    manager: ConnectionManager,
}

impl RedisResetTokenStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

fn token_key(token: &str) -> String {
    format!("{FORGET_PASSWORD_PREFIX}{token}")
}

#[async_trait::async_trait]
impl ResetTokenStore for RedisResetTokenStore {
    async fn issue(&self, user_id: i32, ttl: Duration) -> Result<Uuid, AppError> {
        let token = Uuid::new_v4();
        let mut con = self.manager.clone();
        let _: () = con.set_ex(token_key(&token.to_string()), user_id, ttl.as_secs()).await?;
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<i32>, AppError> {
        let mut con = self.manager.clone();
        let user_id: Option<i32> = con.get(token_key(token)).await?;
        Ok(user_id)
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let mut con = self.manager.clone();
        let _: () = con.del(token_key(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_keys_are_prefixed() {
        let key = token_key("abc-123");
        assert_eq!(key, "forget-password:abc-123");
    }
}
