use async_trait::async_trait;
use chrono::Utc;

use crate::{models::users::User, Error, Result};

use super::SqliteRepo;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Inserts an account. The role is decided by the same statement: admin
    /// when the table is empty, user otherwise.
    async fn create_user(&self, username: &str, password: &str) -> Result<User>;
}

#[async_trait]
impl AuthRepository for SqliteRepo {
    async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, role, created_at)
            VALUES (
                ?,
                ?,
                CASE WHEN (SELECT COUNT(*) FROM users) = 0 THEN 'admin' ELSE 'user' END,
                ?
            )
            RETURNING id, username, password, role, created_at
            "#,
        )
        .bind(username)
        .bind(password)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Conflict("Username already exists".to_string())
            }
            other => Error::from(other),
        })?;

        Ok(user)
    }
}
