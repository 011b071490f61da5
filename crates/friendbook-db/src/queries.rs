use crate::Database;
use crate::models::{CommentRow, MessageRow, PostRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

const POST_COLUMNS: &str = "p.id, p.content, p.user_id, u.username, p.created_at";
const COMMENT_COLUMNS: &str = "c.id, c.content, c.user_id, c.post_id, u.username, c.created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    // -- Posts --

    pub fn insert_post(&self, user_id: i64, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (user_id, content) VALUES (?1, ?2)",
                (user_id, content),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON p.user_id = u.id WHERE p.id = ?1"
            );
            conn.query_row(&sql, [id], post_from_row).optional()
        })
    }

    pub fn list_posts_newest_first(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON p.user_id = u.id
                 ORDER BY p.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when the post no longer exists.
    pub fn update_post_content(&self, id: i64, content: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("UPDATE posts SET content = ?1 WHERE id = ?2", (content, id))?;
            Ok(changed > 0)
        })
    }

    /// Delete a post together with its comments.
    /// Returns `None` if the post did not exist, otherwise the number of
    /// comments that went with it.
    pub fn delete_post(&self, id: i64) -> Result<Option<usize>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let comments: i64 =
                tx.query_row("SELECT COUNT(*) FROM comments WHERE post_id = ?1", [id], |r| {
                    r.get(0)
                })?;
            let deleted = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            tx.commit()?;

            if deleted == 0 {
                return Ok(None);
            }
            Ok(Some(usize::try_from(comments)?))
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, post_id: i64, user_id: i64, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (post_id, user_id, content) VALUES (?1, ?2, ?3)",
                (post_id, user_id, content),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_comment(&self, id: i64) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON c.user_id = u.id WHERE c.id = ?1"
            );
            conn.query_row(&sql, [id], comment_from_row).optional()
        })
    }

    /// Every comment, oldest first. The feed groups them by post.
    pub fn list_comments_oldest_first(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON c.user_id = u.id
                 ORDER BY c.id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_comments_for_post(&self, post_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM comments WHERE post_id = ?1", [post_id], |r| {
                    r.get(0)
                })?;
            Ok(usize::try_from(count)?)
        })
    }

    /// Returns false when the comment no longer exists.
    pub fn update_comment_content(&self, id: i64, content: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("UPDATE comments SET content = ?1 WHERE id = ?2", (content, id))?;
            Ok(changed > 0)
        })
    }

    pub fn delete_comment(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, username: &str, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (username, content) VALUES (?1, ?2)",
                (username, content),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_messages_oldest_first(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT content, username, created_at FROM messages ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(MessageRow {
                        content: row.get(0)?,
                        username: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns the number of messages removed.
    pub fn clear_messages(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM messages", [])?))
    }
}

/// True if `err` came from a `UNIQUE` constraint, e.g. a username taken by a
/// concurrent registration.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

/// True if `err` came from a `FOREIGN KEY` constraint, e.g. a comment on a
/// post deleted by a concurrent request.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn has_extended_code(err: &anyhow::Error, code: i32) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _)) if e.extended_code == code
    )
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, filter: &str, value: P) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, username, password FROM users WHERE {filter}");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        content: row.get(1)?,
        user_id: row.get(2)?,
        author_username: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        content: row.get(1)?,
        user_id: row.get(2)?,
        post_id: row.get(3)?,
        author_username: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
