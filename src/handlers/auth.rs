use std::sync::Arc;

use axum::{
    middleware,
    response::{Html, Redirect},
    routing::get,
    Extension, Form, Router,
};
use axum_extra::extract::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use validator::Validate;

use crate::{
    middleware::{require_auth, Viewer, TOKEN_COOKIE},
    models::{
        flash::Flash,
        users::{LoginUserDto, RegisterUserDto},
    },
    views::{self, PageContext},
    AppState, Error, Result,
};

use super::redirect_with_notice;

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route(
            "/logout",
            get(logout).route_layer(middleware::from_fn(require_auth)),
        )
}

async fn register_form(Viewer(viewer): Viewer, cookies: Cookies) -> Html<String> {
    let ctx = PageContext {
        user: viewer.as_ref(),
        flash: Flash::take(&cookies),
    };
    views::register_page(&ctx)
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    cookies: Cookies,
    Form(new_user): Form<RegisterUserDto>,
) -> Result<Redirect> {
    let registered = match new_user.validate() {
        Ok(()) => {
            app_state
                .auth_service
                .register(new_user.username.trim(), &new_user.password)
                .await
        }
        Err(errors) => Err(Error::from(errors)),
    };

    match registered {
        Ok(_) => {
            Flash::info("Account created. You can now log in.").set(&cookies);
            Ok(Redirect::to("/login"))
        }
        Err(err) => redirect_with_notice(err, &cookies, "/register"),
    }
}

async fn login_form(Viewer(viewer): Viewer, cookies: Cookies) -> Html<String> {
    let ctx = PageContext {
        user: viewer.as_ref(),
        flash: Flash::take(&cookies),
    };
    views::login_page(&ctx)
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    cookies: Cookies,
    Form(user): Form<LoginUserDto>,
) -> Result<Redirect> {
    if let Err(errors) = user.validate() {
        return redirect_with_notice(Error::from(errors), &cookies, "/login");
    }

    let token = match app_state
        .auth_service
        .login(user.username.trim(), &user.password)
        .await
    {
        Ok(token) => token,
        Err(Error::Unauthorized) => {
            Flash::warning("Invalid username or password.").set(&cookies);
            return Ok(Redirect::to("/login"));
        }
        Err(err) => return Err(err),
    };

    let cookie_duration =
        time::Duration::minutes(app_state.auth_service.token_max_age_minutes());
    let cookie = Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookies.add(cookie);

    Flash::info(format!("Welcome back, {}.", user.username.trim())).set(&cookies);
    Ok(Redirect::to("/"))
}

pub async fn logout(cookies: Cookies) -> Redirect {
    cookies.remove(Cookie::build((TOKEN_COOKIE, "")).path("/").build());
    Flash::info("You have been logged out.").set(&cookies);
    Redirect::to("/")
}
