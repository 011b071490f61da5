//! Database row types: these map directly to SQLite rows.
//! Post and comment rows carry the author's username from a join.

use chrono::{DateTime, NaiveDateTime, Utc};
use friendbook_types::Owned;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

pub struct PostRow {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub author_username: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
    pub author_username: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub content: String,
    pub username: String,
    pub created_at: String,
}

impl Owned for PostRow {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for CommentRow {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Parse a stored `created_at` value.
///
/// Rows written by this schema are RFC 3339; plain `datetime('now')` values
/// ("YYYY-MM-DD HH:MM:SS", no zone) are accepted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
