use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    models::{
        posts::{Post, PostDraft, PostOutcome, RenderedPost, Upload},
        users::User,
    },
    repositories::posts_repo::PostsRepository,
    services::{markup, media::MediaStore},
    Error, Result,
};

#[derive(Clone)]
pub struct PostsService {
    repo: Arc<dyn PostsRepository>,
    media: MediaStore,
}

impl PostsService {
    pub fn new(repo: Arc<dyn PostsRepository>, media: MediaStore) -> Self {
        Self { repo, media }
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>> {
        self.repo.get_posts().await
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.repo.get_post(post_id).await?.ok_or(Error::NotFound)
    }

    pub async fn view_post(&self, post_id: i64) -> Result<RenderedPost> {
        let post = self.get_post(post_id).await?;
        let html = markup::render_post(post.id, &post.content);
        Ok(RenderedPost { post, html })
    }

    /// Persists the post first to obtain its id, then stores the image and
    /// records its name. A failure after the first write leaves a valid post
    /// without an image.
    pub async fn create_post(
        &self,
        author: &User,
        draft: PostDraft,
        upload: Option<Upload>,
    ) -> Result<PostOutcome> {
        self.validate(&draft, upload.as_ref())?;

        let post = self
            .repo
            .create_post(
                Some(author.id),
                &author.username,
                draft.title.trim(),
                &draft.content,
                Utc::now(),
            )
            .await?;
        info!(post_id = post.id, author = %author.username, "Created post");

        match upload {
            Some(upload) => self.attach_image(post, upload).await,
            None => Ok(PostOutcome {
                post,
                warning: None,
            }),
        }
    }

    pub async fn update_post(
        &self,
        editor: &User,
        post_id: i64,
        draft: PostDraft,
        upload: Option<Upload>,
    ) -> Result<PostOutcome> {
        let existing = self.get_post(post_id).await?;
        if !existing.can_be_modified_by(editor) {
            warn!(post_id, user_id = editor.id, "Rejected edit by non-owner");
            return Err(Error::Forbidden);
        }
        self.validate(&draft, upload.as_ref())?;

        let post = self
            .repo
            .update_post(post_id, draft.title.trim(), &draft.content)
            .await?;
        info!(post_id, editor = %editor.username, "Updated post");

        match upload {
            Some(upload) => self.attach_image(post, upload).await,
            None => Ok(PostOutcome {
                post,
                warning: None,
            }),
        }
    }

    /// Removes the media directory, then the row. Media cleanup failures are
    /// logged and do not stop the row deletion.
    pub async fn delete_post(&self, actor: &User, post_id: i64) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        if !post.can_be_modified_by(actor) {
            warn!(post_id, user_id = actor.id, "Rejected delete by non-owner");
            return Err(Error::Forbidden);
        }

        if let Err(err) = self.media.delete(post_id).await {
            error!(post_id, error = %err, "Failed to remove media directory");
        }

        if !self.repo.delete_post(post_id).await? {
            return Err(Error::NotFound);
        }
        info!(post_id, user = %actor.username, "Deleted post");

        Ok(post)
    }

    pub async fn media_path(&self, post_id: i64, filename: &str) -> Result<PathBuf> {
        Ok(self.media.resolve(post_id, filename).await?)
    }

    /// Inserts two welcome posts when the store is empty.
    pub async fn seed_if_empty(&self) -> Result<()> {
        if self.repo.count_posts().await? > 0 {
            return Ok(());
        }

        let seeds = [
            (
                "Getting Started with the Blog",
                "Welcome to the blog! This is the first post, stored in SQLite.",
                "Admin",
            ),
            (
                "Understanding Web Development",
                "Web development involves **front-end**, **back-end**, and database technologies.",
                "Developer",
            ),
        ];
        for (title, content, author) in seeds {
            self.repo
                .create_post(None, author, title, content, Utc::now())
                .await?;
        }
        info!("Seeded initial posts");
        Ok(())
    }

    fn validate(&self, draft: &PostDraft, upload: Option<&Upload>) -> Result<()> {
        draft.validate()?;
        if draft.title.trim().is_empty() {
            return Err(Error::BadRequest("Title is required".to_string()));
        }
        if let Some(upload) = upload {
            self.media.validate(upload)?;
        }
        Ok(())
    }

    async fn attach_image(&self, post: Post, upload: Upload) -> Result<PostOutcome> {
        let stored = self
            .media
            .replace(post.id, post.image_file.as_deref(), &upload)
            .await;

        match stored {
            Ok(filename) => {
                let post = self.repo.set_image(post.id, Some(&filename)).await?;
                Ok(PostOutcome {
                    post,
                    warning: None,
                })
            }
            Err(err) => {
                error!(post_id = post.id, error = %err, "Failed to store image");
                Ok(PostOutcome {
                    post,
                    warning: Some("The post was saved but its image could not be stored.".to_string()),
                })
            }
        }
    }
}
