//! HTML pages. Every user-supplied value goes through `html_escape`; the
//! rendered post body is the only markup embedded as-is.

use axum::{http::StatusCode, response::Html};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::{
    models::{
        flash::{Flash, FlashKind},
        posts::{Post, RenderedPost},
        users::User,
    },
    services::markup::media_url,
};

/// Per-request data shared by every page.
pub struct PageContext<'a> {
    pub user: Option<&'a User>,
    pub flash: Option<Flash>,
}

fn layout(ctx: &PageContext<'_>, title: &str, body: &str) -> Html<String> {
    let nav = match ctx.user {
        Some(user) => format!(
            r#"<span>Signed in as {}</span> <a href="/new_post">New post</a> <a href="/logout">Log out</a>"#,
            text(&user.username)
        ),
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#.to_string(),
    };

    let flash = match &ctx.flash {
        Some(flash) => {
            let class = match flash.kind {
                FlashKind::Info => "flash info",
                FlashKind::Warning => "flash warning",
            };
            format!(r#"<p class="{}">{}</p>"#, class, text(&flash.message))
        }
        None => String::new(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<header><a href="/">Home</a> {nav}</header>
{flash}
<main>
{body}
</main>
</body>
</html>
"#,
        title = text(title),
        nav = nav,
        flash = flash,
        body = body,
    ))
}

pub fn index_page(ctx: &PageContext<'_>, posts: &[Post]) -> Html<String> {
    let items: String = if posts.is_empty() {
        "<p>No posts yet.</p>".to_string()
    } else {
        posts
            .iter()
            .map(|post| {
                format!(
                    r#"<article><h2><a href="/post/{id}">{title}</a></h2><p class="meta">By {author} on {date}</p></article>"#,
                    id = post.id,
                    title = text(&post.title),
                    author = text(&post.author),
                    date = post.date_posted.format("%Y-%m-%d %H:%M"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    layout(ctx, "Blog", &format!("<h1>Latest posts</h1>\n{}", items))
}

pub fn post_page(ctx: &PageContext<'_>, rendered: &RenderedPost) -> Html<String> {
    let post = &rendered.post;

    let image = post
        .image_file
        .as_deref()
        .map(|file| {
            format!(
                r#"<img class="main-image" src="{}" alt="{}">"#,
                attr(&media_url(post.id, file)),
                attr(&post.title)
            )
        })
        .unwrap_or_default();

    let controls = match ctx.user {
        Some(user) if post.can_be_modified_by(user) => format!(
            r#"<a href="/post/{id}/edit">Edit</a>
<form method="post" action="/post/{id}/delete"><button type="submit">Delete</button></form>"#,
            id = post.id
        ),
        _ => String::new(),
    };

    let body = format!(
        r#"<article>
<h1>{title}</h1>
<p class="meta">By {author} on {date}</p>
{image}
<div class="content">{content}</div>
{controls}
</article>"#,
        title = text(&post.title),
        author = text(&post.author),
        date = post.date_posted.format("%Y-%m-%d %H:%M"),
        image = image,
        content = rendered.html,
        controls = controls,
    );

    layout(ctx, &post.title, &body)
}

/// Create form when `post` is `None`, edit form otherwise.
pub fn post_form_page(ctx: &PageContext<'_>, post: Option<&Post>) -> Html<String> {
    let (heading, action, title, content) = match post {
        Some(post) => (
            "Edit post",
            format!("/post/{}/edit", post.id),
            post.title.as_str(),
            post.content.as_str(),
        ),
        None => ("New post", "/new_post".to_string(), "", ""),
    };

    let current_image = post
        .and_then(|post| post.image_file.as_deref())
        .map(|file| format!("<p>Current image: {}</p>", text(file)))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}" enctype="multipart/form-data">
<label>Title <input type="text" name="title" maxlength="100" required value="{title}"></label>
<label>Content <textarea name="content" rows="16" required>{content}</textarea></label>
{current_image}
<label>Image <input type="file" name="image" accept=".png,.jpg,.jpeg,.gif"></label>
<button type="submit">Save</button>
</form>"#,
        heading = heading,
        action = attr(&action),
        title = attr(title),
        content = text(content),
        current_image = current_image,
    );

    layout(ctx, heading, &body)
}

pub fn register_page(ctx: &PageContext<'_>) -> Html<String> {
    let body = r#"<h1>Register</h1>
<form method="post" action="/register">
<label>Username <input type="text" name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="password_confirm" required></label>
<button type="submit">Create account</button>
</form>"#;
    layout(ctx, "Register", body)
}

pub fn login_page(ctx: &PageContext<'_>) -> Html<String> {
    let body = r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Username <input type="text" name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>"#;
    layout(ctx, "Log in", body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let ctx = PageContext {
        user: None,
        flash: None,
    };
    let heading = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{} {}</h1>\n<p>{}</p>",
        status.as_u16(),
        text(heading),
        text(message)
    );
    layout(&ctx, heading, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post() -> Post {
        Post {
            id: 4,
            title: "<script>alert(1)</script>".to_string(),
            content: "body".to_string(),
            author: "mallory & co".to_string(),
            user_id: Some(2),
            date_posted: Utc::now(),
            image_file: Some("pic.png".to_string()),
        }
    }

    #[test]
    fn user_values_are_escaped() {
        let ctx = PageContext {
            user: None,
            flash: Some(Flash::warning("<b>careful</b>")),
        };
        let Html(page) = index_page(&ctx, &[post()]);

        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("mallory &amp; co"));
        assert!(page.contains("&lt;b&gt;careful&lt;/b&gt;"));
    }

    #[test]
    fn post_page_embeds_rendered_html_and_main_image() {
        let ctx = PageContext {
            user: None,
            flash: None,
        };
        let rendered = RenderedPost {
            post: post(),
            html: "<p><em>hi</em></p>".to_string(),
        };
        let Html(page) = post_page(&ctx, &rendered);

        assert!(page.contains("<p><em>hi</em></p>"));
        assert!(page.contains(r#"src="/uploads/4/pic.png""#));
        assert!(!page.contains("/post/4/edit"));
    }
}
