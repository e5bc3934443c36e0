use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::users::{User, UserRole};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub user_id: Option<i64>,
    pub date_posted: DateTime<Utc>,
    /// Bare filename inside the post's media directory.
    pub image_file: Option<String>,
}

impl Post {
    pub fn can_be_modified_by(&self, user: &User) -> bool {
        user.role == UserRole::Admin || self.user_id == Some(user.id)
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be between 1 and 100 characters"
    ))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// A file received from a form, before any validation.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of a create or edit: the stored post plus a notice when the
/// image could not be stored after the record was written.
#[derive(Debug)]
pub struct PostOutcome {
    pub post: Post,
    pub warning: Option<String>,
}

#[derive(Debug)]
pub struct RenderedPost {
    pub post: Post,
    pub html: String,
}
