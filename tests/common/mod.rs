#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use backend_blog::{
    app,
    config::{default_extensions, Config},
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0\0\0\0";

const BOUNDARY: &str = "----blogtestboundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

/// Configuration backed by a SQLite file and an upload directory in `dir`.
pub fn test_config(dir: &Path) -> Config {
    Config {
        database_url: format!("sqlite://{}", dir.join("blog.db").display()),
        db_max_connections: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        jwt_maxage: 60,
        upload_dir: dir.join("uploads"),
        allowed_extensions: default_extensions(),
        max_upload_bytes: 1024 * 1024,
        seed_posts: false,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = test_config(dir.path());
    customize(&mut config);

    let state = AppState::init(config).await.expect("app state");
    TestApp {
        router: app(state.clone()),
        state,
        dir,
    }
}

pub struct Image<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("infallible")
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::get(path);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, path: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        image: Option<Image<'_>>,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some(image) = image {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, image.filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(image.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let mut req = Request::post(path).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body)).unwrap()).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Response<Body> {
        self.post_form(
            "/register",
            &format!(
                "username={}&password={}&password_confirm={}",
                username, password, password
            ),
            None,
        )
        .await
    }

    /// Registers and logs in, returning the `Cookie` header value.
    pub async fn login_as(&self, username: &str) -> String {
        let password = "correct-horse";
        let res = self.register(username, password).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let res = self
            .post_form(
                "/login",
                &format!("username={}&password={}", username, password),
                None,
            )
            .await;
        assert_eq!(location(&res), "/");
        token_cookie(&res).expect("login sets a token cookie")
    }

    /// Creates a post through the form and returns its id.
    pub async fn create_post(
        &self,
        cookie: &str,
        title: &str,
        content: &str,
        image: Option<Image<'_>>,
    ) -> i64 {
        let res = self
            .post_multipart(
                "/new_post",
                &[("title", title), ("content", content)],
                image,
                Some(cookie),
            )
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        location(&res)
            .strip_prefix("/post/")
            .and_then(|id| id.parse().ok())
            .expect("redirects to the new post")
    }
}

pub fn location(res: &Response<Body>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn set_cookie(res: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

/// `token=...` pair ready to send back as a `Cookie` header.
pub fn token_cookie(res: &Response<Body>) -> Option<String> {
    set_cookie(res, "token").filter(|pair| pair.len() > "token=".len())
}

/// Decoded flash message set by the response, if any.
pub fn flash(res: &Response<Body>) -> Option<String> {
    let pair = set_cookie(res, "flash")?;
    let value = pair.strip_prefix("flash=")?;
    let decoded = urlencoding::decode(value).ok()?;
    decoded.split_once('|').map(|(_, msg)| msg.to_string())
}

pub async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_text(res: Response<Body>) -> String {
    String::from_utf8_lossy(&body_bytes(res).await).into_owned()
}
