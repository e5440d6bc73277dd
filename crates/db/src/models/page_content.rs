//! Page content (revision) model.
//!
//! Revision [`CURRENT_REVISION`](wikistore_core::page::CURRENT_REVISION) is the
//! live content; non-negative revisions are backups.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikistore_core::types::{Revision, Timestamp};

/// A row from the `page_contents` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct PageContent {
    pub page: String,
    pub revision: Revision,
    pub title: String,
    pub username: String,
    pub modified_at: Timestamp,
    pub content: String,
    pub comment: String,
}

impl PageContent {
    /// The editable fields of this revision.
    pub fn edit(&self) -> ContentEdit {
        ContentEdit {
            title: self.title.clone(),
            username: self.username.clone(),
            modified_at: self.modified_at,
            comment: self.comment.clone(),
            content: self.content.clone(),
        }
    }
}

/// DTO carrying the fields written to a content row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEdit {
    pub title: String,
    pub username: String,
    pub modified_at: Timestamp,
    pub comment: String,
    pub content: String,
}
