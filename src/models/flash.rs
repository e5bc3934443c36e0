use tower_cookies::{Cookie, Cookies};

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlashKind {
    Info,
    Warning,
}

/// One-shot notice carried to the next rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Warning,
            message: message.into(),
        }
    }

    pub fn set(self, cookies: &Cookies) {
        let kind = match self.kind {
            FlashKind::Info => "info",
            FlashKind::Warning => "warning",
        };
        let value = format!("{}|{}", kind, self.message);
        let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(&value).into_owned()))
            .path("/")
            .http_only(true)
            .build();
        cookies.add(cookie);
    }

    pub fn take(cookies: &Cookies) -> Option<Self> {
        let raw = cookies.get(FLASH_COOKIE)?.value().to_string();
        cookies.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());

        let decoded = urlencoding::decode(&raw).ok()?;
        let (kind, message) = decoded.split_once('|')?;
        let kind = match kind {
            "warning" => FlashKind::Warning,
            _ => FlashKind::Info,
        };
        Some(Self {
            kind,
            message: message.to_string(),
        })
    }
}
