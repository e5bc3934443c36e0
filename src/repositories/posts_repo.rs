use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::{models::posts::Post, Result};

use super::SqliteRepo;

const POST_COLUMNS: &str = "id, title, content, author, user_id, date_posted, image_file";

#[async_trait]
pub trait PostsRepository: Sync + Send {
    /// All posts, newest first.
    async fn get_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, post_id: i64) -> Result<Option<Post>>;
    async fn create_post(
        &self,
        user_id: Option<i64>,
        author: &str,
        title: &str,
        content: &str,
        date_posted: DateTime<Utc>,
    ) -> Result<Post>;
    async fn update_post(&self, post_id: i64, title: &str, content: &str) -> Result<Post>;
    async fn set_image(&self, post_id: i64, image_file: Option<&str>) -> Result<Post>;
    /// Returns whether a row was deleted.
    async fn delete_post(&self, post_id: i64) -> Result<bool>;
    async fn count_posts(&self) -> Result<i64>;
}

#[async_trait]
impl PostsRepository for SqliteRepo {
    #[instrument(skip(self))]
    async fn get_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts ORDER BY date_posted DESC, id DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE id = ?",
            POST_COLUMNS
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self, content))]
    async fn create_post(
        &self,
        user_id: Option<i64>,
        author: &str,
        title: &str,
        content: &str,
        date_posted: DateTime<Utc>,
    ) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, content, author, user_id, date_posted)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(title)
        .bind(content)
        .bind(author)
        .bind(user_id)
        .bind(date_posted)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self, content))]
    async fn update_post(&self, post_id: i64, title: &str, content: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = ?, content = ?
            WHERE id = ?
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(title)
        .bind(content)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self))]
    async fn set_image(&self, post_id: i64, image_file: Option<&str>) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET image_file = ? WHERE id = ? RETURNING {}",
            POST_COLUMNS
        ))
        .bind(image_file)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_posts(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
