use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;

use crate::{models::users::User, AppState, Error, Result};

pub const TOKEN_COOKIE: &str = "token";

/// The authenticated user of a request, attached by [`identify`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Optional identity for pages open to everyone.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<User>);

/// Resolves the session cookie to a user once per request. Missing or
/// invalid tokens leave the request anonymous.
pub async fn identify(mut req: Request, next: Next) -> Result<impl IntoResponse> {
    let app_state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(Error::InternalServerError)?;

    let cookies = CookieJar::from_headers(req.headers());
    let token = cookies.get(TOKEN_COOKIE).map(|c| c.value().to_string());

    if let Some(token) = token {
        match app_state.users_service.user_from_token(&token).await {
            Some(user) => {
                req.extensions_mut().insert(CurrentUser(user));
            }
            None => tracing::debug!("Ignoring invalid session token"),
        }
    }

    Ok(next.run(req).await)
}

pub async fn require_auth(req: Request, next: Next) -> Result<impl IntoResponse> {
    if req.extensions().get::<CurrentUser>().is_none() {
        return Err(Error::Unauthorized);
    }

    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(Error::Unauthorized)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> core::result::Result<Self, Self::Rejection> {
        Ok(Viewer(
            parts
                .extensions
                .get::<CurrentUser>()
                .map(|current| current.0.clone()),
        ))
    }
}
