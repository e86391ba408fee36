use crate::error::app_error::AppError;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use uuid::Uuid;

pub const SESSION_PREFIX: &str = "sess:";

/// Maps an opaque session id to a user id. Entries carry no TTL: only the
/// cookie expires, logout is the sole server-side removal path.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: i32) -> Result<Uuid, AppError>;
    async fn get(&self, session_id: &Uuid) -> Result<Option<i32>, AppError>;
    async fn destroy(&self, session_id: &Uuid) -> Result<(), AppError>;
}

pub struct RedisSessionStore {
    manager: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

fn session_key(session_id: &Uuid) -> String {
    format!("{SESSION_PREFIX}{session_id}")
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: i32) -> Result<Uuid, AppError> {
        let session_id = Uuid::new_v4();
        let mut con = self.manager.clone();
        let _: () = con.set(session_key(&session_id), user_id).await?;
        Ok(session_id)
    }

    async fn get(&self, session_id: &Uuid) -> Result<Option<i32>, AppError> {
        let mut con = self.manager.clone();
        let user_id: Option<i32> = con.get(session_key(session_id)).await?;
        Ok(user_id)
    }

    async fn destroy(&self, session_id: &Uuid) -> Result<(), AppError> {
        let mut con = self.manager.clone();
        let _: () = con.del(session_key(session_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keys_are_prefixed() {
        let id = Uuid::new_v4();
        let key = session_key(&id);
        assert!(key.starts_with("sess:"));
        assert!(key.ends_with(&id.to_string()));
    }
}
