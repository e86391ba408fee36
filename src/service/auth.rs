use crate::config::{Config, ResetConfig};
use crate::database::postgres_repository::PostgresRepository;
use crate::database::reset_token::{RedisResetTokenStore, ResetTokenStore};
use crate::database::session::{RedisSessionStore, SessionStore};
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::field_error::{FieldError, codes};
use crate::models::user::{RegisterRequest, User, UserResponse, validate_email, validate_password, validate_username};
use crate::service::email::EmailService;
use crate::service::password;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// Result of an auth operation that may log the caller in. On success the
/// route binds the fresh session to the cookie jar; on failure it returns
/// the field error inside the uniform envelope.
pub enum AuthOutcome {
    Success { user: User, session_id: Uuid },
    Failure(FieldError),
}

impl AuthOutcome {
    fn fail(id: u16, field: &str, message: impl Into<String>) -> Self {
        AuthOutcome::Failure(FieldError::new(id, field, message))
    }

    pub fn into_response(self, mut on_login: impl FnMut(Uuid)) -> UserResponse {
        match self {
            AuthOutcome::Success { user, session_id } => {
                on_login(session_id);
                UserResponse::success(&user)
            }
            AuthOutcome::Failure(error) => UserResponse::failure(error),
        }
    }
}

/// Owns the per-request store instances so `AuthService` can borrow them.
/// Routes build one of these from the managed pool and Redis manager.
pub struct AuthStores {
    pub repo: PostgresRepository,
    pub sessions: RedisSessionStore,
    pub reset_tokens: RedisResetTokenStore,
    pub email: EmailService,
}

impl AuthStores {
    pub fn new(pool: PgPool, manager: ConnectionManager, config: &Config) -> Self {
        Self {
            repo: PostgresRepository { pool },
            sessions: RedisSessionStore::new(manager.clone()),
            reset_tokens: RedisResetTokenStore::new(manager),
            email: EmailService::new(config.email.clone()),
        }
    }

    pub fn service<'a>(&'a self, config: &'a Config) -> AuthService<'a> {
        AuthService::new(&self.repo, &self.sessions, &self.reset_tokens, &self.email, &config.reset)
    }
}

/// Orchestrates register / login / logout / me / forgot-password /
/// change-password over the credential, session and reset-token stores.
/// Every operation resolves to a structured outcome; store failures are
/// folded into the envelope and never escape to the transport layer.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    sessions: &'a dyn SessionStore,
    reset_tokens: &'a dyn ResetTokenStore,
    email: &'a EmailService,
    reset: &'a ResetConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(
        users: &'a dyn UserRepository,
        sessions: &'a dyn SessionStore,
        reset_tokens: &'a dyn ResetTokenStore,
        email: &'a EmailService,
        reset: &'a ResetConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            reset_tokens,
            email,
            reset,
        }
    }

    pub async fn register(&self, input: &RegisterRequest) -> AuthOutcome {
        if let Some(error) = validate_username(&input.username) {
            return AuthOutcome::Failure(error);
        }
        if let Some(error) = validate_email(&input.email) {
            return AuthOutcome::Failure(error);
        }
        if let Some(error) = validate_password(&input.password, codes::PASSWORD, "password") {
            return AuthOutcome::Failure(error);
        }

        let password_hash = match password::hash(&input.password) {
            Ok(hash) => hash,
            Err(e) => return AuthOutcome::fail(codes::REGISTER, "register", e.detail()),
        };

        // Uniqueness is enforced by the store; a concurrent registration
        // race loses with a duplicate key, never a merge.
        let user = match self.users.insert(&input.username, &input.email, &password_hash).await {
            Ok(user) => user,
            Err(AppError::DuplicateKey) => return AuthOutcome::fail(codes::EMAIL, "email", "Email already exists."),
            Err(e) => return AuthOutcome::fail(codes::REGISTER, "register", e.detail()),
        };

        match self.sessions.create(user.id).await {
            Ok(session_id) => AuthOutcome::Success { user, session_id },
            Err(e) => AuthOutcome::fail(codes::REGISTER, "register", e.detail()),
        }
    }

    pub async fn login(&self, email: &str, password_input: &str) -> AuthOutcome {
        let user = match self.users.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => return AuthOutcome::fail(codes::EMAIL, "email", "Invalid email."),
            Err(e) => return AuthOutcome::fail(codes::LOGIN, "login", e.detail()),
        };

        match password::verify(&user.password_hash, password_input) {
            Ok(true) => {}
            Ok(false) => return AuthOutcome::fail(codes::PASSWORD, "password", "Invalid password."),
            Err(e) => return AuthOutcome::fail(codes::LOGIN, "login", e.detail()),
        }

        match self.sessions.create(user.id).await {
            Ok(session_id) => AuthOutcome::Success { user, session_id },
            Err(e) => AuthOutcome::fail(codes::LOGIN, "login", e.detail()),
        }
    }

    /// `true` when the session entry was removed, `false` when destruction
    /// failed. The cookie is cleared by the route either way.
    pub async fn logout(&self, session_id: &Uuid) -> bool {
        match self.sessions.destroy(session_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to destroy session: {}", e.detail());
                false
            }
        }
    }

    pub async fn me(&self, session_id: Option<Uuid>) -> UserResponse {
        let Some(session_id) = session_id else {
            return UserResponse::failure(FieldError::session("Please login."));
        };

        let user_id = match self.sessions.get(&session_id).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return UserResponse::failure(FieldError::session("No user found. Please register.")),
            Err(e) => return UserResponse::failure(FieldError::session(e.detail())),
        };

        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => UserResponse::success(&user),
            Ok(None) => UserResponse::failure(FieldError::session("No user found. Please register.")),
            Err(e) => UserResponse::failure(FieldError::session(e.detail())),
        }
    }

    /// Issues a reset token and emails the reset link. Reports whether the
    /// email is registered; that leaks account existence and is kept on
    /// purpose, the reference clients depend on the distinct message.
    /// Email delivery is fire-and-forget: a send failure is logged and the
    /// operation still succeeds.
    pub async fn forgot_password(&self, email: &str) -> Result<(), FieldError> {
        if let Some(error) = validate_email(email) {
            return Err(error);
        }

        let user = match self.users.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(FieldError::new(codes::EMAIL, "email", "User not found. Please register.")),
            Err(e) => return Err(FieldError::new(codes::FORGOT_PASSWORD, "forgotPassword", e.detail())),
        };

        let ttl = Duration::from_secs(self.reset.token_ttl_seconds);
        let token = match self.reset_tokens.issue(user.id, ttl).await {
            Ok(token) => token,
            Err(e) => return Err(FieldError::new(codes::FORGOT_PASSWORD, "forgotPassword", e.detail())),
        };

        if let Err(e) = self
            .email
            .send_reset_email(&user.email, &user.username, &token.to_string(), &self.reset.frontend_url)
            .await
        {
            tracing::error!("failed to send password reset email: {}", e.detail());
        }

        Ok(())
    }

    pub async fn change_password(&self, token: &str, new_password: &str) -> AuthOutcome {
        let user_id = match self.reset_tokens.resolve(token).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return AuthOutcome::fail(codes::TOKEN, "token", "Token expired."),
            Err(e) => return AuthOutcome::fail(codes::CHANGE_PASSWORD, "changePassword", e.detail()),
        };

        // Validation happens after token resolution, so a rejected password
        // leaves the token intact for a retry.
        if let Some(error) = validate_password(new_password, codes::NEW_PASSWORD, "newPassword") {
            return AuthOutcome::Failure(error);
        }

        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return AuthOutcome::fail(codes::EMAIL, "email", "User doesn't exist. Please register."),
            Err(e) => return AuthOutcome::fail(codes::CHANGE_PASSWORD, "changePassword", e.detail()),
        };

        let outcome = async {
            let password_hash = password::hash(new_password)?;
            self.users.update_password(user.id, &password_hash).await?;
            self.reset_tokens.revoke(token).await?;
            // Auto-login with a fresh session.
            self.sessions.create(user.id).await
        }
        .await;

        match outcome {
            Ok(session_id) => AuthOutcome::Success { user, session_id },
            Err(e) => AuthOutcome::fail(codes::CHANGE_PASSWORD, "changePassword", e.detail()),
        }
    }
}
