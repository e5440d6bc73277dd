//! Page model.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use wikistore_core::page::PageStatus;
use wikistore_core::types::Timestamp;

/// A row from the `pages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub name: String,
    pub status: PageStatus,
    pub created_at: Timestamp,
}

impl<'r> FromRow<'r, SqliteRow> for Page {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let code: String = row.try_get("status")?;
        let status = PageStatus::from_code(&code).map_err(|err| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: Box::new(err),
        })?;
        Ok(Self {
            name: row.try_get("name")?,
            status,
            created_at: row.try_get("created_at")?,
        })
    }
}
