use crate::models::field_error::{FieldError, codes};
use chrono::{DateTime, Utc};
use regex::Regex;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::sync::LazyLock;

/// Standard email-shape pattern. Deliberately permissive about the local
/// part; the mailbox is only ever proven by the reset-email round trip.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern must compile")
});

/// Database row. `password_hash` never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Uniform response envelope for every auth-flow operation: either
/// `{id, user}` or `{id, errors: [...]}`, never both.
#[derive(Debug, Serialize, JsonSchema)]
pub struct UserResponse {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

impl UserResponse {
    pub fn success(user: &User) -> Self {
        Self {
            id: user.id,
            errors: None,
            user: Some(UserDto::from(user)),
        }
    }

    pub fn failure(error: FieldError) -> Self {
        Self {
            id: 0,
            errors: Some(vec![error]),
            user: None,
        }
    }
}

/// forgot-password answers a bare `true` on the happy path and the usual
/// envelope on failure; the untagged representation keeps both on the wire
/// exactly as clients expect.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ForgotPasswordResponse {
    Done(bool),
    Failed(UserResponse),
}

pub fn validate_username(username: &str) -> Option<FieldError> {
    if username.chars().count() < 4 {
        return Some(FieldError::new(
            codes::USERNAME,
            "username",
            "Username must be at least 4 characters long.",
        ));
    }
    if username.contains('@') {
        return Some(FieldError::new(codes::USERNAME, "username", "Username must not include \"@\"."));
    }
    None
}

pub fn validate_email(email: &str) -> Option<FieldError> {
    if EMAIL_RE.is_match(email) {
        None
    } else {
        Some(FieldError::new(codes::EMAIL, "email", "Invalid email."))
    }
}

/// Password length must be strictly between 3 and 16. The same rule applies
/// to registration (code 103) and password change (code 108).
pub fn validate_password(password: &str, code: u16, field: &str) -> Option<FieldError> {
    let len = password.chars().count();
    if len <= 3 || len >= 16 {
        Some(FieldError::new(code, field, "Password must be between 4 and 15 characters long."))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn username_shorter_than_four_is_rejected() {
        let err = validate_username("abc").expect("too short");
        assert_eq!(err.id, codes::USERNAME);
    }

    #[test]
    fn username_with_at_sign_is_rejected() {
        let err = validate_username("not@name").expect("contains @");
        assert_eq!(err.id, codes::USERNAME);
    }

    #[test]
    fn username_of_four_plain_characters_is_accepted() {
        assert!(validate_username("benn").is_none());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("ben@example.com").is_none());
        assert!(validate_email("ben.awad@sub.example.co").is_none());
        assert!(validate_email("ben").is_some());
        assert!(validate_email("ben@").is_some());
        assert!(validate_email("@example.com").is_some());
        assert!(validate_email("ben@localhost").is_some());
    }

    #[test]
    fn password_boundaries_are_exclusive() {
        // 3 and 16 rejected, 4 and 15 accepted
        assert!(validate_password("abc", codes::PASSWORD, "password").is_some());
        assert!(validate_password("a".repeat(16).as_str(), codes::PASSWORD, "password").is_some());
        assert!(validate_password("abcd", codes::PASSWORD, "password").is_none());
        assert!(validate_password("a".repeat(15).as_str(), codes::PASSWORD, "password").is_none());
    }

    #[test]
    fn password_error_carries_requested_code_and_field() {
        let err = validate_password("x", codes::NEW_PASSWORD, "newPassword").expect("too short");
        assert_eq!(err.id, codes::NEW_PASSWORD);
        assert_eq!(err.field, "newPassword");
    }

    #[test]
    fn success_envelope_omits_errors_and_hash() {
        let user = User {
            id: 7,
            username: "benn".to_string(),
            email: "ben@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(UserResponse::success(&user)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["user"]["username"], "benn");
        assert!(json.get("errors").is_none());
        assert!(json["user"].get("passwordHash").is_none());
        assert!(json["user"].get("password_hash").is_none());
    }

    #[test]
    fn failure_envelope_has_zero_id() {
        let json = serde_json::to_value(UserResponse::failure(FieldError::session("Please login."))).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["errors"][0]["id"], 110);
        assert!(json.get("user").is_none());
    }

    proptest! {
        #[test]
        fn password_validity_depends_only_on_length(len in 0usize..32) {
            let password: String = "p".repeat(len);
            let verdict = validate_password(&password, codes::PASSWORD, "password");
            if (4..=15).contains(&len) {
                prop_assert!(verdict.is_none());
            } else {
                prop_assert!(verdict.is_some());
            }
        }
    }
}
