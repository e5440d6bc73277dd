//! Repository for `navigation_paths` and their ordered page entries.

use std::collections::BTreeMap;

use wikistore_core::validation::validate_name;

use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::models::navigation_path::NavigationPath;
use crate::transaction::{Expect, TransactionGuard};

/// Provides CRUD operations for navigation paths.
pub struct NavigationPathRepo;

impl NavigationPathRepo {
    /// Create a path over `pages` in the given order.
    ///
    /// Succeeds only if the path row and every entry were written.
    pub async fn add(db: &CommandExecutor, name: &str, pages: &[&str]) -> DbResult<NavigationPath> {
        validate_name("Navigation path", name)?;

        let mut tx = TransactionGuard::begin(db, "add_navigation_path").await?;
        insert_path(&mut tx, name, pages).await?;
        tx.commit_if(Expect::Exactly(1 + pages.len() as u64))
            .await?;

        Ok(NavigationPath {
            name: name.to_string(),
            pages: pages.iter().map(|page| page.to_string()).collect(),
        })
    }

    /// Replace the entries of an existing path.
    pub async fn modify(db: &CommandExecutor, name: &str, pages: &[&str]) -> DbResult<NavigationPath> {
        let mut tx = TransactionGuard::begin(db, "modify_navigation_path").await?;
        let removed = tx
            .execute(sqlx::query("DELETE FROM navigation_paths WHERE name = ?1").bind(name))
            .await?;
        if removed == 0 {
            return Err(DbError::not_found("navigation path", name));
        }
        insert_path(&mut tx, name, pages).await?;
        tx.commit_if(Expect::Exactly(2 + pages.len() as u64))
            .await?;

        Ok(NavigationPath {
            name: name.to_string(),
            pages: pages.iter().map(|page| page.to_string()).collect(),
        })
    }

    /// Delete a path and its entries.
    pub async fn remove(db: &CommandExecutor, name: &str) -> DbResult<()> {
        let affected = db
            .execute(
                "remove_navigation_path",
                sqlx::query("DELETE FROM navigation_paths WHERE name = ?1").bind(name),
            )
            .await?;
        if affected == 0 {
            return Err(DbError::not_found("navigation path", name));
        }
        Ok(())
    }

    pub async fn find(db: &CommandExecutor, name: &str) -> DbResult<Option<NavigationPath>> {
        let found = db
            .scalar(
                "find_navigation_path",
                sqlx::query_scalar::<_, String>("SELECT name FROM navigation_paths WHERE name = ?1")
                    .bind(name),
            )
            .await?;
        let Some(name) = found else {
            return Ok(None);
        };
        let pages = db
            .fetch_all(
                "navigation_path_pages",
                sqlx::query_as::<_, (String,)>(
                    "SELECT page FROM navigation_path_bindings
                     WHERE navigation_path = ?1 ORDER BY position ASC",
                )
                .bind(&name),
            )
            .await?;
        Ok(Some(NavigationPath {
            name,
            pages: pages.into_iter().map(|(page,)| page).collect(),
        }))
    }

    /// Every path with its pages in position order, ordered by name.
    pub async fn list(db: &CommandExecutor) -> DbResult<Vec<NavigationPath>> {
        let rows = db
            .fetch_all(
                "list_navigation_paths",
                sqlx::query_as::<_, (String, Option<String>)>(
                    "SELECT p.name, b.page
                     FROM navigation_paths p
                     LEFT JOIN navigation_path_bindings b ON b.navigation_path = p.name
                     ORDER BY p.name ASC, b.position ASC",
                ),
            )
            .await?;

        let mut paths: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, page) in rows {
            let pages = paths.entry(name).or_default();
            if let Some(page) = page {
                pages.push(page);
            }
        }
        Ok(paths
            .into_iter()
            .map(|(name, pages)| NavigationPath { name, pages })
            .collect())
    }
}

async fn insert_path(tx: &mut TransactionGuard, name: &str, pages: &[&str]) -> DbResult<()> {
    tx.execute(sqlx::query("INSERT INTO navigation_paths (name) VALUES (?1)").bind(name))
        .await?;
    for (position, page) in pages.iter().enumerate() {
        tx.execute(
            sqlx::query(
                "INSERT INTO navigation_path_bindings (navigation_path, page, position)
                 VALUES (?1, ?2, ?3)",
            )
            .bind(name)
            .bind(*page)
            .bind(position as i64),
        )
        .await?;
    }
    Ok(())
}
