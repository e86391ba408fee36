use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub creator_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub creator_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            text: post.text.clone(),
            creator_id: post.creator_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
}

/// Update payload. A missing title means "no change requested" and the
/// update endpoint answers with null.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
}
