use std::{env, path::PathBuf};

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Session lifetime in minutes.
    pub jwt_maxage: i64,
    pub upload_dir: PathBuf,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    pub seed_posts: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        dotenv::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() {
            return Err(Error::Config(
                "JWT_SECRET environment variable must be set and non-empty".to_string(),
            ));
        }

        let max_upload_mb: usize = parse_var("MAX_UPLOAD_MB", 16)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://blog.db".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            jwt_secret,
            jwt_maxage: parse_var("JWT_MAXAGE", 60 * 24)?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .map(|raw| parse_extensions(&raw))
                .unwrap_or_else(|_| default_extensions()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            seed_posts: env::var("SEED_POSTS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_normalized() {
        assert_eq!(
            parse_extensions(" PNG, .jpg,,webp "),
            vec!["png".to_string(), "jpg".to_string(), "webp".to_string()]
        );
    }
}
