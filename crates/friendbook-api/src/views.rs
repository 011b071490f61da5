//! Askama templates and the view models they render.

use askama::Template;
use axum::response::Html;
use tracing::{error, warn};

use friendbook_db::models::parse_timestamp;
use friendbook_types::Identity;

use crate::error::AppError;

/// A post as shown on the home page.
#[derive(Debug)]
pub struct FeedPost {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub posted_at: String,
    /// Viewer may edit or delete it.
    pub owned: bool,
    pub comments: Vec<FeedComment>,
}

#[derive(Debug)]
pub struct FeedComment {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub owned: bool,
}

#[derive(Debug)]
pub struct ChatLine {
    pub author: String,
    pub content: String,
    pub sent_at: String,
}

/// Home page: feed plus composer or login links
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub flashes: Vec<String>,
    pub viewer: Option<Identity>,
    pub posts: Vec<FeedPost>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub flashes: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<String>,
}

/// Chat room
#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub flashes: Vec<String>,
    pub viewer: Option<Identity>,
    pub messages: Vec<ChatLine>,
}

/// Shared error envelope for every failed request
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub flashes: Vec<String>,
    pub status: u16,
    pub reason: String,
    pub message: String,
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| {
        error!("Template rendering failed: {:?}", e);
        AppError::from(e)
    })
}

/// Format a stored timestamp for display, e.g. `%Y-%m-%d %H:%M`.
pub fn display_time(raw: &str, format: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => ts.format(format).to_string(),
        None => {
            warn!("Corrupt created_at '{}'", raw);
            raw.to_string()
        }
    }
}
