//! Discussion message model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikistore_core::message_tree::{Thread, ThreadNode};
use wikistore_core::types::{MessageId, Timestamp};

/// A row from the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Message {
    pub id: MessageId,
    pub page: String,
    /// Parent message id, or [`NO_PARENT`](wikistore_core::message_tree::NO_PARENT).
    pub parent: MessageId,
    pub username: String,
    pub posted_at: Timestamp,
    pub subject: String,
    pub body: String,
}

impl ThreadNode for Message {
    fn id(&self) -> MessageId {
        self.id
    }

    fn parent(&self) -> MessageId {
        self.parent
    }
}

/// A message with its nested replies.
pub type MessageThread = Thread<Message>;

/// DTO for posting a new message.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessage {
    /// Parent message id, or `-1` to start a new thread.
    pub parent: MessageId,
    pub username: String,
    pub posted_at: Timestamp,
    pub subject: String,
    pub body: String,
}

/// DTO for editing an existing message. The parent link is not editable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMessage {
    pub username: String,
    pub posted_at: Timestamp,
    pub subject: String,
    pub body: String,
}
