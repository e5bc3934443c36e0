//! Markdown rendering for post bodies.
//!
//! Bare image references such as `![alt](pic.png)` point into the post's own
//! media directory and are rewritten to `/uploads/{post_id}/pic.png` before
//! the Markdown is converted. Rooted paths and URLs are left alone.

use std::{borrow::Cow, sync::LazyLock};

use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};

static IMAGE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[(?P<alt>[^\]]*)\]\((?P<path>[^()"]*?)(?P<title>\s+"[^"]*")?\)"#)
        .expect("image reference pattern is valid")
});

static URL_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("scheme pattern is valid")
});

pub fn media_url(post_id: i64, filename: &str) -> String {
    format!("/uploads/{}/{}", post_id, filename)
}

/// Rewrites bare image paths to the post's media URL. Purely textual: the
/// referenced files are not checked.
pub fn rewrite_image_paths(post_id: i64, markup: &str) -> Cow<'_, str> {
    IMAGE_REF.replace_all(markup, |caps: &Captures| {
        let alt = &caps["alt"];
        let raw_path = &caps["path"];
        let title = caps.name("title").map_or("", |m| m.as_str());

        let path = raw_path.trim();
        let rewritten = if path.is_empty() || path.starts_with('/') || URL_SCHEME.is_match(path) {
            raw_path.to_string()
        } else {
            media_url(post_id, path.strip_prefix("./").unwrap_or(path))
        };

        format!("![{}]({}{})", alt, rewritten, title)
    })
}

pub fn markdown_to_html(markup: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markup, options);
    let mut output = String::with_capacity(markup.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Full pipeline used by the post page.
pub fn render_post(post_id: i64, markup: &str) -> String {
    markdown_to_html(&rewrite_image_paths(post_id, markup))
}
