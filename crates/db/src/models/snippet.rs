//! Snippet model.

use serde::Serialize;
use sqlx::FromRow;

/// A row from the `snippets` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Snippet {
    pub name: String,
    pub content: String,
}
