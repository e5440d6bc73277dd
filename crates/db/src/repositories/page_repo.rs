//! Repository for the `pages` table.
//!
//! Renames and removals cascade to content, category bindings, messages and
//! navigation path entries through the schema's foreign keys.

use wikistore_core::page::{PageStatus, CURRENT_REVISION, PLACEHOLDER};
use wikistore_core::types::Timestamp;
use wikistore_core::validation::validate_name;

use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::models::page::Page;
use crate::transaction::{Expect, TransactionGuard};

/// Column list for pages queries.
const COLUMNS: &str = "name, status, created_at";

/// Provides CRUD operations for pages.
pub struct PageRepo;

impl PageRepo {
    /// Create a page together with its placeholder current content.
    ///
    /// Fails with a constraint error if a page with that name already exists.
    pub async fn add(
        db: &CommandExecutor,
        name: &str,
        created_at: Timestamp,
    ) -> DbResult<Page> {
        validate_name("Page", name)?;

        let mut tx = TransactionGuard::begin(db, "add_page").await?;
        tx.execute(
            sqlx::query("INSERT INTO pages (name, status, created_at) VALUES (?1, ?2, ?3)")
                .bind(name)
                .bind(PageStatus::Normal.as_code())
                .bind(created_at),
        )
        .await?;
        tx.execute(
            sqlx::query(
                "INSERT INTO page_contents
                    (page, revision, title, modified_at, username, content, comment)
                 VALUES (?1, ?2, ?3, ?4, ?3, ?3, ?3)",
            )
            .bind(name)
            .bind(CURRENT_REVISION)
            .bind(PLACEHOLDER)
            .bind(created_at),
        )
        .await?;
        tx.commit_if(Expect::Exactly(2)).await?;

        tracing::debug!(source = "page_repo", page = name, "Page created");
        Ok(Page {
            name: name.to_string(),
            status: PageStatus::Normal,
            created_at,
        })
    }

    /// Find a page by name.
    pub async fn find(db: &CommandExecutor, name: &str) -> DbResult<Option<Page>> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE name = ?1");
        db.fetch_optional("find_page", sqlx::query_as::<_, Page>(&query).bind(name))
            .await
    }

    /// List all pages, ordered by name.
    pub async fn list(db: &CommandExecutor) -> DbResult<Vec<Page>> {
        let query = format!("SELECT {COLUMNS} FROM pages ORDER BY name ASC");
        db.fetch_all("list_pages", sqlx::query_as::<_, Page>(&query))
            .await
    }

    /// Rename a page, returning the renamed descriptor.
    pub async fn rename(db: &CommandExecutor, name: &str, new_name: &str) -> DbResult<Page> {
        validate_name("Page", new_name)?;
        let query = format!("UPDATE pages SET name = ?1 WHERE name = ?2 RETURNING {COLUMNS}");
        db.fetch_optional(
            "rename_page",
            sqlx::query_as::<_, Page>(&query).bind(new_name).bind(name),
        )
        .await?
        .ok_or_else(|| DbError::not_found("page", name))
    }

    /// Change the status of a page, returning the updated descriptor.
    pub async fn set_status(
        db: &CommandExecutor,
        name: &str,
        status: PageStatus,
    ) -> DbResult<Page> {
        let query = format!("UPDATE pages SET status = ?1 WHERE name = ?2 RETURNING {COLUMNS}");
        db.fetch_optional(
            "set_page_status",
            sqlx::query_as::<_, Page>(&query)
                .bind(status.as_code())
                .bind(name),
        )
        .await?
        .ok_or_else(|| DbError::not_found("page", name))
    }

    /// Delete a page and everything it owns.
    pub async fn remove(db: &CommandExecutor, name: &str) -> DbResult<()> {
        let affected = db
            .execute(
                "remove_page",
                sqlx::query("DELETE FROM pages WHERE name = ?1").bind(name),
            )
            .await?;
        if affected == 0 {
            return Err(DbError::not_found("page", name));
        }
        Ok(())
    }

    /// `true` if a page with that name exists.
    pub async fn exists(db: &CommandExecutor, name: &str) -> DbResult<bool> {
        let count = db
            .scalar(
                "page_exists",
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pages WHERE name = ?1").bind(name),
            )
            .await?;
        Ok(count.unwrap_or(0) > 0)
    }
}
