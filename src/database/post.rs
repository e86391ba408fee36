use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::post::Post;

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Post>, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, AppError>;
    async fn insert(&self, title: &str, text: &str, creator_id: i32) -> Result<Post, AppError>;
    /// Write side of the title update; the caller decides whether a write
    /// is warranted at all (null title means no-op).
    async fn update_title(&self, id: i32, title: &str) -> Result<Option<Post>, AppError>;
    async fn delete(&self, id: i32) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl PostRepository for PostgresRepository {
    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, creator_id, created_at, updated_at
            FROM posts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, creator_id, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn insert(&self, title: &str, text: &str, creator_id: i32) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, text, creator_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, text, creator_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(text)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update_title(&self, id: i32, title: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, title, text, creator_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM posts WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(())
    }
}
