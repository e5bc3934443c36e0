use std::sync::Arc;

use axum::{
    extract::{Multipart, Path},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Router,
};
use tower_cookies::Cookies;

use crate::{
    middleware::{require_auth, CurrentUser, Viewer},
    models::{
        flash::Flash,
        posts::{PostDraft, PostOutcome, Upload},
    },
    views::{self, PageContext},
    AppState, Error, Result,
};

use super::redirect_with_notice;

pub fn posts_handler() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/post/{id}", get(show_post))
}

pub fn post_editor_handler() -> Router {
    Router::new()
        .route("/new_post", get(new_post_form).post(create_post))
        .route("/post/{id}/edit", get(edit_post_form).post(update_post))
        .route("/post/{id}/delete", post(delete_post))
        .route_layer(middleware::from_fn(require_auth))
}

async fn index(
    Extension(app_state): Extension<Arc<AppState>>,
    Viewer(viewer): Viewer,
    cookies: Cookies,
) -> Result<Html<String>> {
    let posts = app_state.posts_service.get_posts().await?;
    let ctx = PageContext {
        user: viewer.as_ref(),
        flash: Flash::take(&cookies),
    };
    Ok(views::index_page(&ctx, &posts))
}

async fn show_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Viewer(viewer): Viewer,
    Path(post_id): Path<i64>,
    cookies: Cookies,
) -> Result<Html<String>> {
    let rendered = app_state.posts_service.view_post(post_id).await?;
    let ctx = PageContext {
        user: viewer.as_ref(),
        flash: Flash::take(&cookies),
    };
    Ok(views::post_page(&ctx, &rendered))
}

async fn new_post_form(CurrentUser(user): CurrentUser, cookies: Cookies) -> Html<String> {
    let ctx = PageContext {
        user: Some(&user),
        flash: Flash::take(&cookies),
    };
    views::post_form_page(&ctx, None)
}

async fn create_post(
    Extension(app_state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    cookies: Cookies,
    multipart: Multipart,
) -> Result<Redirect> {
    let (draft, upload) = read_post_form(multipart).await?;

    match app_state
        .posts_service
        .create_post(&user, draft, upload)
        .await
    {
        Ok(outcome) => Ok(finish(outcome, &cookies, "Post created.")),
        Err(err) => redirect_with_notice(err, &cookies, "/new_post"),
    }
}

async fn edit_post_form(
    Extension(app_state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    cookies: Cookies,
) -> Result<Response> {
    let post = app_state.posts_service.get_post(post_id).await?;
    if !post.can_be_modified_by(&user) {
        let redirect = redirect_with_notice(Error::Forbidden, &cookies, &post_path(post_id))?;
        return Ok(redirect.into_response());
    }

    let ctx = PageContext {
        user: Some(&user),
        flash: Flash::take(&cookies),
    };
    Ok(views::post_form_page(&ctx, Some(&post)).into_response())
}

async fn update_post(
    Extension(app_state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    cookies: Cookies,
    multipart: Multipart,
) -> Result<Redirect> {
    let (draft, upload) = read_post_form(multipart).await?;

    match app_state
        .posts_service
        .update_post(&user, post_id, draft, upload)
        .await
    {
        Ok(outcome) => Ok(finish(outcome, &cookies, "Post updated.")),
        Err(Error::Forbidden) => {
            redirect_with_notice(Error::Forbidden, &cookies, &post_path(post_id))
        }
        Err(err) => redirect_with_notice(err, &cookies, &format!("/post/{}/edit", post_id)),
    }
}

async fn delete_post(
    Extension(app_state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    cookies: Cookies,
) -> Result<Redirect> {
    match app_state.posts_service.delete_post(&user, post_id).await {
        Ok(post) => {
            Flash::info(format!("Deleted \"{}\".", post.title)).set(&cookies);
            Ok(Redirect::to("/"))
        }
        Err(err) => redirect_with_notice(err, &cookies, &post_path(post_id)),
    }
}

fn post_path(post_id: i64) -> String {
    format!("/post/{}", post_id)
}

fn finish(outcome: PostOutcome, cookies: &Cookies, done: &str) -> Redirect {
    match outcome.warning {
        Some(warning) => Flash::warning(warning).set(cookies),
        None => Flash::info(done).set(cookies),
    }
    Redirect::to(&post_path(outcome.post.id))
}

/// Reads `title`, `content` and the optional `image` file. A file input left
/// empty by the browser arrives with an empty filename and is ignored.
async fn read_post_form(mut multipart: Multipart) -> Result<(PostDraft, Option<Upload>)> {
    let mut draft = PostDraft::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                draft.title = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(e.body_text()))?;
            }
            "content" => {
                draft.content = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(e.body_text()))?;
            }
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(e.body_text()))?;
                if !filename.is_empty() {
                    upload = Some(Upload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok((draft, upload))
}
