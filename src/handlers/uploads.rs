use std::sync::Arc;

use axum::{
    extract::{Path, Request},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::{AppState, Result};

pub fn uploads_handler() -> Router {
    Router::new().route("/uploads/{id}/{filename}", get(serve_upload))
}

/// Streams a media file; the name is resolved strictly inside the post's
/// own directory.
async fn serve_upload(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((post_id, filename)): Path<(i64, String)>,
    req: Request,
) -> Result<Response> {
    let path = app_state
        .posts_service
        .media_path(post_id, &filename)
        .await?;

    let response = ServeFile::new(path)
        .oneshot(req)
        .await
        .unwrap_or_else(|never| match never {});

    Ok(response.into_response())
}
