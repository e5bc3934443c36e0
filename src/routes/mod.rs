use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, Extension, Router};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{
        auth::auth_handler,
        posts::{post_editor_handler, posts_handler},
        uploads::uploads_handler,
    },
    middleware::identify,
    AppState,
};

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .merge(posts_handler())
        .merge(post_editor_handler())
        .merge(auth_handler())
        .merge(uploads_handler())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(identify))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}
