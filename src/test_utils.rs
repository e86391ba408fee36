use crate::database::reset_token::ResetTokenStore;
use crate::database::session::SessionStore;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// In-memory credential store mirroring the Postgres uniqueness rules.
#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, username: &str, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == email || u.username == username) {
            return Err(AppError::DuplicateKey);
        }
        let now = Utc::now();
        let user = User {
            id: rows.len() as i32 + 1,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(user) = rows.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct MemorySessions {
    map: Mutex<HashMap<Uuid, i32>>,
}

impl MemorySessions {
    pub fn user_for(&self, session_id: &Uuid) -> Option<i32> {
        self.map.lock().unwrap().get(session_id).copied()
    }

    pub fn count(&self) -> usize {
        self.map.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessions {
    async fn create(&self, user_id: i32) -> Result<Uuid, AppError> {
        let session_id = Uuid::new_v4();
        self.map.lock().unwrap().insert(session_id, user_id);
        Ok(session_id)
    }

    async fn get(&self, session_id: &Uuid) -> Result<Option<i32>, AppError> {
        Ok(self.map.lock().unwrap().get(session_id).copied())
    }

    async fn destroy(&self, session_id: &Uuid) -> Result<(), AppError> {
        // like redis DEL, removing an absent key is not an error
        self.map.lock().unwrap().remove(session_id);
        Ok(())
    }
}

/// Credential store whose every operation fails, for exercising the paths
/// that fold a database outage into the response envelope.
pub struct FailingUsers;

fn database_down() -> AppError {
    AppError::db("Database error", sqlx::Error::PoolTimedOut)
}

#[async_trait::async_trait]
impl UserRepository for FailingUsers {
    async fn find_by_id(&self, _id: i32) -> Result<Option<User>, AppError> {
        Err(database_down())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, AppError> {
        Err(database_down())
    }

    async fn insert(&self, _username: &str, _email: &str, _password_hash: &str) -> Result<User, AppError> {
        Err(database_down())
    }

    async fn update_password(&self, _id: i32, _password_hash: &str) -> Result<(), AppError> {
        Err(database_down())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Err(database_down())
    }
}

/// Session store whose every operation fails, as if Redis were unreachable.
pub struct FailingSessions;

fn redis_down() -> AppError {
    AppError::redis("Redis error", redis::RedisError::from((redis::ErrorKind::Io, "connection refused")))
}

#[async_trait::async_trait]
impl SessionStore for FailingSessions {
    async fn create(&self, _user_id: i32) -> Result<Uuid, AppError> {
        Err(redis_down())
    }

    async fn get(&self, _session_id: &Uuid) -> Result<Option<i32>, AppError> {
        Err(redis_down())
    }

    async fn destroy(&self, _session_id: &Uuid) -> Result<(), AppError> {
        Err(redis_down())
    }
}

/// In-memory reset-token store with real expiry semantics so TTL-dependent
/// flows can be exercised without Redis.
#[derive(Default)]
pub struct MemoryResetTokens {
    map: Mutex<HashMap<String, (i32, Instant)>>,
}

impl MemoryResetTokens {
    pub fn count(&self) -> usize {
        self.map.lock().unwrap().len()
    }

    /// The single outstanding token; panics unless exactly one exists.
    pub fn only_token(&self) -> String {
        let map = self.map.lock().unwrap();
        assert_eq!(map.len(), 1, "expected exactly one reset token");
        map.keys().next().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ResetTokenStore for MemoryResetTokens {
    async fn issue(&self, user_id: i32, ttl: Duration) -> Result<Uuid, AppError> {
        let token = Uuid::new_v4();
        let expires_at = Instant::now() + ttl;
        self.map.lock().unwrap().insert(token.to_string(), (user_id, expires_at));
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<i32>, AppError> {
        let map = self.map.lock().unwrap();
        Ok(map.get(token).and_then(|(user_id, expires_at)| {
            if Instant::now() < *expires_at {
                Some(*user_id)
            } else {
                None
            }
        }))
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.map.lock().unwrap().remove(token);
        Ok(())
    }
}
