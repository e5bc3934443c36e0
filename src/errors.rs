use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::{services::media::MediaError, views};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    NotFound,
    Unauthorized,
    Forbidden,
    InternalServerError,
    BadRequest(String),
    Conflict(String),
    Config(String),
    DatabaseError(sqlx::Error),
    InvalidHashFormat(argon2::password_hash::Error),
    Storage(std::io::Error),
}

impl Error {
    /// Text shown to the user as a flash notice instead of an error page.
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::BadRequest(msg) | Self::Conflict(msg) => Some(msg.clone()),
            Self::Forbidden => Some("You are not allowed to modify this post.".to_string()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::InternalServerError => write!(f, "internal server error"),
            Self::BadRequest(msg) => write!(f, "bad request: {}", msg),
            Self::Conflict(msg) => write!(f, "conflict: {}", msg),
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::DatabaseError(err) => write!(f, "database error: {}", err),
            Self::InvalidHashFormat(err) => write!(f, "invalid hash format: {}", err),
            Self::Storage(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => return Redirect::to("/login").into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            Self::InvalidHashFormat(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid hash format".to_string(),
            ),
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error".to_string(),
            ),
            Self::Config(_) | Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, views::error_page(status, &message)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        error!("Migration failed: {:?}", err);
        Self::DatabaseError(err.into())
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        error!("Invalid hash format");
        Self::InvalidHashFormat(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        Self::BadRequest(messages.join(" "))
    }
}

impl From<MediaError> for Error {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound | MediaError::OutsideDirectory => Self::NotFound,
            MediaError::Io(err) => {
                error!("Media storage error: {:?}", err);
                Self::Storage(err)
            }
            other => Self::BadRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_rejections_become_notices() {
        let err: Error = MediaError::DisallowedExtension("exe".to_string()).into();
        assert!(err.notice().is_some());

        let err: Error = MediaError::OutsideDirectory.into();
        assert!(matches!(err, Error::NotFound));
        assert!(err.notice().is_none());
    }

    #[test]
    fn unauthorized_redirects_to_login() {
        let response = Error::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }
}
