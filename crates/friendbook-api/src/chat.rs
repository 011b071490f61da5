use tracing::info;

use friendbook_db::Database;
use friendbook_types::Identity;

use crate::error::AppError;
use crate::views::{ChatLine, display_time};

/// Append a message to the shared room. Messages cannot be edited afterwards.
pub fn post_message(db: &Database, author: &Identity, content: &str) -> Result<i64, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message cannot be empty.".into()));
    }

    let message_id = db.insert_message(&author.username, content)?;
    info!(message_id, username = %author.username, "Chat message posted");
    Ok(message_id)
}

/// Whole room history in the order it was written.
pub fn list_messages(db: &Database) -> Result<Vec<ChatLine>, AppError> {
    let lines = db
        .list_messages_oldest_first()?
        .into_iter()
        .map(|row| ChatLine {
            sent_at: display_time(&row.created_at, "%H:%M"),
            author: row.username,
            content: row.content,
        })
        .collect();
    Ok(lines)
}

/// Wipe the room. Returns how many messages were removed.
pub fn clear_all(db: &Database) -> Result<usize, AppError> {
    let removed = db.clear_messages()?;
    info!(removed, "Chat cleared");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity {
            user_id: 1,
            username: "alice".into(),
        }
    }

    #[test]
    fn messages_come_back_in_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let bob = Identity {
            user_id: 2,
            username: "bob".into(),
        };

        post_message(&db, &alice(), "hi").unwrap();
        post_message(&db, &bob, "hey").unwrap();
        post_message(&db, &alice(), "how are you?").unwrap();

        let lines: Vec<(String, String)> = list_messages(&db)
            .unwrap()
            .into_iter()
            .map(|l| (l.author, l.content))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("alice".to_string(), "hi".to_string()),
                ("bob".to_string(), "hey".to_string()),
                ("alice".to_string(), "how are you?".to_string()),
            ]
        );
    }

    #[test]
    fn clear_then_list_is_empty() {
        let db = Database::open_in_memory().unwrap();
        post_message(&db, &alice(), "one").unwrap();
        post_message(&db, &alice(), "two").unwrap();

        assert_eq!(clear_all(&db).unwrap(), 2);
        assert!(list_messages(&db).unwrap().is_empty());
        assert_eq!(clear_all(&db).unwrap(), 0);
    }

    #[test]
    fn blank_message_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            post_message(&db, &alice(), "  "),
            Err(AppError::Validation(_))
        ));
        assert!(list_messages(&db).unwrap().is_empty());
    }
}
