//! Posts and comments: creation, owner-only edit/delete, and the home feed.

use std::collections::HashMap;

use tracing::{info, warn};

use friendbook_db::{Database, is_foreign_key_violation};
use friendbook_types::{Identity, Owned, is_owner};

use crate::error::AppError;
use crate::views::{FeedComment, FeedPost, display_time};

pub fn create_post(db: &Database, author: &Identity, content: &str) -> Result<i64, AppError> {
    let content = require_text(content, "Post")?;
    let post_id = db.insert_post(author.user_id, content)?;
    info!(post_id, user_id = author.user_id, "Post created");
    Ok(post_id)
}

pub fn edit_post(
    db: &Database,
    post_id: i64,
    viewer: Option<&Identity>,
    new_content: &str,
) -> Result<(), AppError> {
    let post = db.get_post(post_id)?.ok_or(AppError::NotFound("Post"))?;
    authorize(&post, viewer, "post", post_id)?;

    let new_content = require_text(new_content, "Post")?;
    if !db.update_post_content(post_id, new_content)? {
        return Err(AppError::NotFound("Post"));
    }

    info!(post_id, "Post edited");
    Ok(())
}

/// Delete a post and every comment on it. Returns how many comments went too.
pub fn delete_post(
    db: &Database,
    post_id: i64,
    viewer: Option<&Identity>,
) -> Result<usize, AppError> {
    let post = db.get_post(post_id)?.ok_or(AppError::NotFound("Post"))?;
    authorize(&post, viewer, "post", post_id)?;

    let removed_comments = db.delete_post(post_id)?.ok_or(AppError::NotFound("Post"))?;
    info!(post_id, removed_comments, "Post deleted");
    Ok(removed_comments)
}

pub fn create_comment(
    db: &Database,
    post_id: i64,
    author: &Identity,
    content: &str,
) -> Result<i64, AppError> {
    if db.get_post(post_id)?.is_none() {
        return Err(AppError::NotFound("Post"));
    }

    let content = require_text(content, "Comment")?;
    // The post can vanish between the lookup and the insert.
    let comment_id = db
        .insert_comment(post_id, author.user_id, content)
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Post")
            } else {
                AppError::Internal(e)
            }
        })?;
    info!(comment_id, post_id, user_id = author.user_id, "Comment created");
    Ok(comment_id)
}

pub fn edit_comment(
    db: &Database,
    comment_id: i64,
    viewer: Option<&Identity>,
    new_content: &str,
) -> Result<(), AppError> {
    let comment = db.get_comment(comment_id)?.ok_or(AppError::NotFound("Comment"))?;
    authorize(&comment, viewer, "comment", comment_id)?;

    let new_content = require_text(new_content, "Comment")?;
    if !db.update_comment_content(comment_id, new_content)? {
        return Err(AppError::NotFound("Comment"));
    }

    info!(comment_id, "Comment edited");
    Ok(())
}

pub fn delete_comment(
    db: &Database,
    comment_id: i64,
    viewer: Option<&Identity>,
) -> Result<(), AppError> {
    let comment = db.get_comment(comment_id)?.ok_or(AppError::NotFound("Comment"))?;
    authorize(&comment, viewer, "comment", comment_id)?;

    if !db.delete_comment(comment_id)? {
        return Err(AppError::NotFound("Comment"));
    }

    info!(comment_id, "Comment deleted");
    Ok(())
}

/// Posts newest first, each with its comments oldest first.
pub fn feed(db: &Database, viewer: Option<&Identity>) -> Result<Vec<FeedPost>, AppError> {
    let posts = db.list_posts_newest_first()?;
    let comment_rows = db.list_comments_oldest_first()?;

    // Rows arrive oldest first; pushing keeps that order per post.
    let mut comments_by_post: HashMap<i64, Vec<FeedComment>> = HashMap::new();
    for row in comment_rows {
        let owned = is_owner(&row, viewer);
        comments_by_post.entry(row.post_id).or_default().push(FeedComment {
            id: row.id,
            content: row.content,
            author: row.author_username,
            owned,
        });
    }

    let feed = posts
        .into_iter()
        .map(|row| FeedPost {
            owned: is_owner(&row, viewer),
            comments: comments_by_post.remove(&row.id).unwrap_or_default(),
            posted_at: display_time(&row.created_at, "%Y-%m-%d %H:%M"),
            id: row.id,
            content: row.content,
            author: row.author_username,
        })
        .collect();

    Ok(feed)
}

fn authorize<R: Owned>(
    resource: &R,
    viewer: Option<&Identity>,
    kind: &str,
    id: i64,
) -> Result<(), AppError> {
    if is_owner(resource, viewer) {
        return Ok(());
    }

    warn!(
        kind,
        id,
        owner = resource.owner_id(),
        viewer = viewer.map(|v| v.user_id),
        "Rejected change by non-owner"
    );
    Err(AppError::Unauthorized)
}

fn require_text<'a>(raw: &'a str, what: &str) -> Result<&'a str, AppError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty.", what)));
    }
    Ok(text)
}
