use axum::response::Redirect;
use tower_cookies::Cookies;

use crate::{models::flash::Flash, Error, Result};

pub mod auth;
pub mod posts;
pub mod uploads;

/// Turns a notice-class error into a flash message and a redirect; any other
/// error is passed through to render as an error page.
pub(crate) fn redirect_with_notice(err: Error, cookies: &Cookies, to: &str) -> Result<Redirect> {
    match err.notice() {
        Some(message) => {
            Flash::warning(message).set(cookies);
            Ok(Redirect::to(to))
        }
        None => Err(err),
    }
}
