//! Repository for the `page_contents` table: current content and backups.
//!
//! Each page has exactly one row at [`CURRENT_REVISION`] and a dense run of
//! backups `0..n`. Every operation that reads backup numbers and then writes
//! does both inside one transaction.

use wikistore_core::error::CoreError;
use wikistore_core::page::{next_backup_revision, resolve_delete_threshold, CURRENT_REVISION};
use wikistore_core::types::Revision;
use wikistore_core::validation::{validate_comment, validate_title, validate_username};

use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::models::page_content::{ContentEdit, PageContent};
use crate::transaction::{Expect, TransactionGuard};

/// Column list for page_contents queries.
const COLUMNS: &str = "page, revision, title, username, modified_at, content, comment";

/// Provides revision management for page content.
pub struct PageContentRepo;

impl PageContentRepo {
    /// The current content of a page.
    pub async fn get_content(db: &CommandExecutor, page: &str) -> DbResult<Option<PageContent>> {
        Self::get_backup_content(db, page, CURRENT_REVISION).await
    }

    /// A specific revision of a page ([`CURRENT_REVISION`] for the current one).
    pub async fn get_backup_content(
        db: &CommandExecutor,
        page: &str,
        revision: Revision,
    ) -> DbResult<Option<PageContent>> {
        let query = format!("SELECT {COLUMNS} FROM page_contents WHERE page = ?1 AND revision = ?2");
        db.fetch_optional(
            "get_backup_content",
            sqlx::query_as::<_, PageContent>(&query)
                .bind(page)
                .bind(revision),
        )
        .await
    }

    /// Backup revision numbers of a page, ascending.
    pub async fn get_backups(db: &CommandExecutor, page: &str) -> DbResult<Vec<Revision>> {
        let rows = db
            .fetch_all(
                "get_backups",
                sqlx::query_as::<_, (Revision,)>(BACKUPS_QUERY).bind(page),
            )
            .await?;
        Ok(rows.into_iter().map(|(revision,)| revision).collect())
    }

    /// Write `edit` into the given revision, creating the row if needed.
    ///
    /// `revision` is either [`CURRENT_REVISION`], an existing backup, or the
    /// next backup number, so the backup run stays dense.
    pub async fn set_backup_content(
        db: &CommandExecutor,
        page: &str,
        revision: Revision,
        edit: &ContentEdit,
    ) -> DbResult<()> {
        validate_edit(edit)?;
        if revision < CURRENT_REVISION {
            return Err(CoreError::Validation(format!("Invalid revision {revision}")).into());
        }

        let mut tx = TransactionGuard::begin(db, "set_backup_content").await?;
        if revision != CURRENT_REVISION {
            let next = next_backup_revision(&read_backups(&mut tx, page).await?);
            if revision > next {
                return Err(CoreError::Validation(format!(
                    "Revision {revision} would leave a gap, the next backup of '{page}' is {next}"
                ))
                .into());
            }
        }
        tx.execute_expecting(
            sqlx::query(
                "INSERT INTO page_contents
                    (page, revision, title, modified_at, username, content, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (page, revision) DO UPDATE SET
                    title = excluded.title,
                    modified_at = excluded.modified_at,
                    username = excluded.username,
                    content = excluded.content,
                    comment = excluded.comment",
            )
            .bind(page)
            .bind(revision)
            .bind(&edit.title)
            .bind(edit.modified_at)
            .bind(&edit.username)
            .bind(&edit.content)
            .bind(&edit.comment),
            1,
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Copy the current content into a new backup, returning its number.
    ///
    /// The current content is left unchanged.
    pub async fn backup(db: &CommandExecutor, page: &str) -> DbResult<Revision> {
        let mut tx = TransactionGuard::begin(db, "backup_page").await?;
        let revision = snapshot_current(&mut tx, page).await?;
        tx.commit().await?;
        tracing::debug!(source = "page_content_repo", page, revision, "Backup created");
        Ok(revision)
    }

    /// Replace the current content, optionally backing it up first.
    ///
    /// The backup and the overwrite are one transaction: if either fails the
    /// page is left untouched.
    pub async fn modify_page(
        db: &CommandExecutor,
        page: &str,
        edit: &ContentEdit,
        backup: bool,
    ) -> DbResult<()> {
        validate_edit(edit)?;

        let mut tx = TransactionGuard::begin(db, "modify_page").await?;
        if backup {
            snapshot_current(&mut tx, page).await?;
        }
        let affected = tx
            .execute(
                sqlx::query(
                    "UPDATE page_contents SET
                        title = ?1, modified_at = ?2, username = ?3, content = ?4, comment = ?5
                     WHERE page = ?6 AND revision = ?7",
                )
                .bind(&edit.title)
                .bind(edit.modified_at)
                .bind(&edit.username)
                .bind(&edit.content)
                .bind(&edit.comment)
                .bind(page)
                .bind(CURRENT_REVISION),
            )
            .await?;
        if affected == 0 {
            return Err(DbError::not_found("page", page));
        }
        tx.commit_if(Expect::Exactly(if backup { 2 } else { 1 }))
            .await?;
        Ok(())
    }

    /// Promote backup `revision` to current content and drop every backup
    /// numbered `revision` or higher.
    pub async fn rollback_page(db: &CommandExecutor, page: &str, revision: Revision) -> DbResult<()> {
        if revision < 0 {
            return Err(CoreError::Validation(format!(
                "Cannot roll back to revision {revision}, backups are numbered from 0"
            ))
            .into());
        }

        let mut tx = TransactionGuard::begin(db, "rollback_page").await?;
        let query = format!("SELECT {COLUMNS} FROM page_contents WHERE page = ?1 AND revision = ?2");
        let target = tx
            .fetch_optional(
                sqlx::query_as::<_, PageContent>(&query)
                    .bind(page)
                    .bind(revision),
            )
            .await?
            .ok_or_else(|| DbError::not_found("backup", format!("{page}#{revision}")))?;

        tx.execute_expecting(
            sqlx::query(
                "UPDATE page_contents SET
                    title = ?1, modified_at = ?2, username = ?3, content = ?4, comment = ?5
                 WHERE page = ?6 AND revision = ?7",
            )
            .bind(&target.title)
            .bind(target.modified_at)
            .bind(&target.username)
            .bind(&target.content)
            .bind(&target.comment)
            .bind(page)
            .bind(CURRENT_REVISION),
            1,
        )
        .await?;
        tx.execute(
            sqlx::query("DELETE FROM page_contents WHERE page = ?1 AND revision >= ?2")
                .bind(page)
                .bind(revision),
        )
        .await?;
        tx.commit_if(Expect::AtLeast(2)).await?;

        tracing::debug!(source = "page_content_repo", page, revision, "Page rolled back");
        Ok(())
    }

    /// Delete backups numbered up to and including `up_to` and renumber the
    /// survivors so they run densely from `0` again.
    ///
    /// [`CURRENT_REVISION`] deletes every backup. A page without backups is
    /// left as is.
    pub async fn delete_backups(db: &CommandExecutor, page: &str, up_to: Revision) -> DbResult<()> {
        if up_to < CURRENT_REVISION {
            return Err(CoreError::Validation(format!("Invalid backup threshold {up_to}")).into());
        }

        let mut tx = TransactionGuard::begin(db, "delete_backups").await?;
        let backups = read_backups(&mut tx, page).await?;
        let Some(threshold) = resolve_delete_threshold(up_to, &backups) else {
            tx.rollback().await?;
            return Ok(());
        };
        let deleted = backups.iter().filter(|r| **r <= threshold).count() as u64;
        let survivors = backups.len() as u64 - deleted;

        tx.execute_expecting(
            sqlx::query("DELETE FROM page_contents WHERE page = ?1 AND revision >= 0 AND revision <= ?2")
                .bind(page)
                .bind(threshold),
            deleted,
        )
        .await?;

        // Park survivors at -2, -3, ... so renumbering never collides with a
        // row that has not moved yet, then flip them back to 0, 1, ...
        tx.execute_expecting(
            sqlx::query(
                "UPDATE page_contents SET revision = -2 - (revision - ?2 - 1)
                 WHERE page = ?1 AND revision > ?2",
            )
            .bind(page)
            .bind(threshold),
            survivors,
        )
        .await?;
        tx.execute_expecting(
            sqlx::query("UPDATE page_contents SET revision = -2 - revision WHERE page = ?1 AND revision <= -2")
                .bind(page),
            survivors,
        )
        .await?;
        tx.commit_if(Expect::Exactly(deleted + 2 * survivors))
            .await?;

        tracing::debug!(source = "page_content_repo", page, threshold, deleted, survivors, "Backups deleted");
        Ok(())
    }
}

const BACKUPS_QUERY: &str =
    "SELECT revision FROM page_contents WHERE page = ?1 AND revision >= 0 ORDER BY revision ASC";

async fn read_backups(tx: &mut TransactionGuard, page: &str) -> DbResult<Vec<Revision>> {
    let rows = tx
        .fetch_all(sqlx::query_as::<_, (Revision,)>(BACKUPS_QUERY).bind(page))
        .await?;
    Ok(rows.into_iter().map(|(revision,)| revision).collect())
}

/// Insert a copy of the current row as the next backup.
async fn snapshot_current(tx: &mut TransactionGuard, page: &str) -> DbResult<Revision> {
    let revision = next_backup_revision(&read_backups(tx, page).await?);
    let affected = tx
        .execute(
            sqlx::query(
                "INSERT INTO page_contents
                    (page, revision, title, modified_at, username, content, comment)
                 SELECT page, ?2, title, modified_at, username, content, comment
                 FROM page_contents WHERE page = ?1 AND revision = ?3",
            )
            .bind(page)
            .bind(revision)
            .bind(CURRENT_REVISION),
        )
        .await?;
    if affected != 1 {
        return Err(DbError::not_found("page", page));
    }
    Ok(revision)
}

fn validate_edit(edit: &ContentEdit) -> Result<(), CoreError> {
    validate_title(&edit.title)?;
    validate_username(&edit.username)?;
    validate_comment("comment", &edit.comment)
}
