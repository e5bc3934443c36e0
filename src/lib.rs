use std::sync::Arc;

use repositories::SqliteRepo;
use services::{
    auth::AuthService, media::MediaStore, posts::PostsService, user::UserService,
};
use sqlx::SqlitePool;

pub use self::errors::{Error, Result};

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod views;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
    pub auth_service: AuthService,
    pub users_service: UserService,
    pub posts_service: PostsService,
}

impl AppState {
    /// Connects and migrates the store and wires the services together.
    pub async fn init(config: Config) -> Result<Self> {
        let pool = repositories::connect(&config).await?;
        repositories::migrate(&pool).await?;

        let db_blog = Arc::new(SqliteRepo::new(pool.clone()));
        let media = MediaStore::new(
            config.upload_dir.clone(),
            config.allowed_extensions.clone(),
        );

        let app_state = Self {
            db_pool: pool,
            auth_service: AuthService::new(
                db_blog.clone(),
                db_blog.clone(),
                config.jwt_secret.clone(),
                config.jwt_maxage,
            ),
            users_service: UserService::new(db_blog.clone(), config.jwt_secret.clone()),
            posts_service: PostsService::new(db_blog, media),
            config,
        };

        if app_state.config.seed_posts {
            app_state.posts_service.seed_if_empty().await?;
        }

        Ok(app_state)
    }
}

/// Builds the full application router around an initialized state.
pub fn app(app_state: AppState) -> axum::Router {
    routes::create_routes(Arc::new(app_state))
}
