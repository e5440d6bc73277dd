//! Repository for the `messages` table.
//!
//! A page's discussion is stored flat and returned as a forest assembled in
//! memory from a single fetch.

use wikistore_core::error::CoreError;
use wikistore_core::message_tree::{assemble_forest, subtree_ids, NO_PARENT};
use wikistore_core::types::MessageId;
use wikistore_core::validation::{validate_comment, validate_username};

use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::models::message::{CreateMessage, Message, MessageThread, UpdateMessage};
use crate::transaction::{Expect, TransactionGuard};

/// Column list for messages queries.
const COLUMNS: &str = "id, page, parent, username, posted_at, subject, body";

/// Provides thread operations for page discussions.
pub struct MessageRepo;

impl MessageRepo {
    /// Every thread of a page. Roots and replies are ordered by id.
    pub async fn list(db: &CommandExecutor, page: &str) -> DbResult<Vec<MessageThread>> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE page = ?1 ORDER BY id ASC");
        let rows = db
            .fetch_all("list_messages", sqlx::query_as::<_, Message>(&query).bind(page))
            .await?;
        Ok(assemble_forest(rows))
    }

    /// Number of messages posted on a page.
    pub async fn count(db: &CommandExecutor, page: &str) -> DbResult<i64> {
        let count = db
            .scalar(
                "count_messages",
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE page = ?1").bind(page),
            )
            .await?;
        Ok(count.unwrap_or(0))
    }

    /// Find a single message of a page.
    pub async fn find(db: &CommandExecutor, page: &str, id: MessageId) -> DbResult<Option<Message>> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE page = ?1 AND id = ?2");
        db.fetch_optional(
            "find_message",
            sqlx::query_as::<_, Message>(&query).bind(page).bind(id),
        )
        .await
    }

    /// Post a message, returning the stored row with its assigned id.
    ///
    /// A reply's parent must be a message of the same page.
    pub async fn add(db: &CommandExecutor, page: &str, input: &CreateMessage) -> DbResult<Message> {
        validate_message(&input.username, &input.subject)?;

        let mut tx = TransactionGuard::begin(db, "add_message").await?;
        if input.parent != NO_PARENT {
            let parent = tx
                .scalar(
                    sqlx::query_scalar::<_, i64>(
                        "SELECT COUNT(*) FROM messages WHERE page = ?1 AND id = ?2",
                    )
                    .bind(page)
                    .bind(input.parent),
                )
                .await?
                .unwrap_or(0);
            if parent == 0 {
                return Err(DbError::not_found("message", input.parent));
            }
        }

        let query = format!(
            "INSERT INTO messages (page, parent, username, posted_at, subject, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {COLUMNS}"
        );
        let message = tx
            .fetch_optional(
                sqlx::query_as::<_, Message>(&query)
                    .bind(page)
                    .bind(input.parent)
                    .bind(&input.username)
                    .bind(input.posted_at)
                    .bind(&input.subject)
                    .bind(&input.body),
            )
            .await?
            .ok_or_else(|| DbError::rows_mismatch("add_message", 1, 0))?;
        tx.commit().await?;

        tracing::debug!(source = "message_repo", page, id = message.id, parent = message.parent, "Message posted");
        Ok(message)
    }

    /// Edit a message. The parent link is left unchanged.
    pub async fn modify(
        db: &CommandExecutor,
        page: &str,
        id: MessageId,
        input: &UpdateMessage,
    ) -> DbResult<Message> {
        validate_message(&input.username, &input.subject)?;

        let query = format!(
            "UPDATE messages SET username = ?1, posted_at = ?2, subject = ?3, body = ?4
             WHERE page = ?5 AND id = ?6
             RETURNING {COLUMNS}"
        );
        db.fetch_optional(
            "modify_message",
            sqlx::query_as::<_, Message>(&query)
                .bind(&input.username)
                .bind(input.posted_at)
                .bind(&input.subject)
                .bind(&input.body)
                .bind(page)
                .bind(id),
        )
        .await?
        .ok_or_else(|| DbError::not_found("message", id))
    }

    /// Delete a message.
    ///
    /// With `cascade` the whole reply subtree goes with it. Without, its
    /// direct replies move up to the deleted message's parent.
    pub async fn remove(
        db: &CommandExecutor,
        page: &str,
        id: MessageId,
        cascade: bool,
    ) -> DbResult<()> {
        let mut tx = TransactionGuard::begin(db, "remove_message").await?;
        let pairs = tx
            .fetch_all(
                sqlx::query_as::<_, (MessageId, MessageId)>(
                    "SELECT id, parent FROM messages WHERE page = ?1",
                )
                .bind(page),
            )
            .await?;
        let Some(&(_, parent)) = pairs.iter().find(|(message, _)| *message == id) else {
            return Err(DbError::not_found("message", id));
        };

        if cascade {
            let doomed = subtree_ids(&pairs, id);
            for message in &doomed {
                tx.execute_expecting(
                    sqlx::query("DELETE FROM messages WHERE page = ?1 AND id = ?2")
                        .bind(page)
                        .bind(*message),
                    1,
                )
                .await?;
            }
            tx.commit_if(Expect::Exactly(doomed.len() as u64)).await?;
            tracing::debug!(source = "message_repo", page, id, removed = doomed.len(), "Thread removed");
        } else {
            let replies = pairs.iter().filter(|(_, p)| *p == id).count() as u64;
            tx.execute_expecting(
                sqlx::query("UPDATE messages SET parent = ?1 WHERE page = ?2 AND parent = ?3")
                    .bind(parent)
                    .bind(page)
                    .bind(id),
                replies,
            )
            .await?;
            tx.execute_expecting(
                sqlx::query("DELETE FROM messages WHERE page = ?1 AND id = ?2")
                    .bind(page)
                    .bind(id),
                1,
            )
            .await?;
            tx.commit_if(Expect::Exactly(replies + 1)).await?;
            tracing::debug!(source = "message_repo", page, id, promoted = replies, "Message removed");
        }
        Ok(())
    }
}

fn validate_message(username: &str, subject: &str) -> Result<(), CoreError> {
    validate_username(username)?;
    validate_comment("subject", subject)
}
