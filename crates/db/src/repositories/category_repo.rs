//! Repository for `categories` and their page bindings.

use std::collections::BTreeMap;

use wikistore_core::error::CoreError;
use wikistore_core::validation::validate_name;

use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::models::category::Category;
use crate::transaction::{Expect, TransactionGuard};

/// Provides CRUD operations for categories and page bindings.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Create an empty category.
    pub async fn add(db: &CommandExecutor, name: &str) -> DbResult<Category> {
        validate_name("Category", name)?;
        db.execute_expecting(
            "add_category",
            sqlx::query("INSERT INTO categories (name) VALUES (?1)").bind(name),
            1,
        )
        .await?;
        Ok(Category {
            name: name.to_string(),
            pages: Vec::new(),
        })
    }

    /// Find a category with its bound pages.
    pub async fn find(db: &CommandExecutor, name: &str) -> DbResult<Option<Category>> {
        let exists = db
            .scalar(
                "find_category",
                sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE name = ?1").bind(name),
            )
            .await?;
        let Some(name) = exists else {
            return Ok(None);
        };
        let pages = Self::pages_of(db, &name).await?;
        Ok(Some(Category { name, pages }))
    }

    /// Every category with its bound pages, ordered by name.
    pub async fn list(db: &CommandExecutor) -> DbResult<Vec<Category>> {
        let rows = db
            .fetch_all(
                "list_categories",
                sqlx::query_as::<_, (String, Option<String>)>(
                    "SELECT c.name, b.page
                     FROM categories c
                     LEFT JOIN category_bindings b ON b.category = c.name
                     ORDER BY c.name ASC, b.page ASC",
                ),
            )
            .await?;

        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, page) in rows {
            let pages = categories.entry(name).or_default();
            if let Some(page) = page {
                pages.push(page);
            }
        }
        Ok(categories
            .into_iter()
            .map(|(name, pages)| Category { name, pages })
            .collect())
    }

    /// Names of the categories a page is bound to, sorted.
    pub async fn categories_for_page(db: &CommandExecutor, page: &str) -> DbResult<Vec<String>> {
        db.fetch_all(
            "categories_for_page",
            sqlx::query_as::<_, (String,)>(
                "SELECT category FROM category_bindings WHERE page = ?1 ORDER BY category ASC",
            )
            .bind(page),
        )
        .await
        .map(|rows| rows.into_iter().map(|(name,)| name).collect())
    }

    /// Rename a category. Bindings follow through the foreign key cascade.
    pub async fn rename(db: &CommandExecutor, name: &str, new_name: &str) -> DbResult<Category> {
        validate_name("Category", new_name)?;
        let affected = db
            .execute(
                "rename_category",
                sqlx::query("UPDATE categories SET name = ?1 WHERE name = ?2")
                    .bind(new_name)
                    .bind(name),
            )
            .await?;
        if affected == 0 {
            return Err(DbError::not_found("category", name));
        }
        let pages = Self::pages_of(db, new_name).await?;
        Ok(Category {
            name: new_name.to_string(),
            pages,
        })
    }

    /// Delete a category and its bindings. The bound pages are kept.
    pub async fn remove(db: &CommandExecutor, name: &str) -> DbResult<()> {
        let affected = db
            .execute(
                "remove_category",
                sqlx::query("DELETE FROM categories WHERE name = ?1").bind(name),
            )
            .await?;
        if affected == 0 {
            return Err(DbError::not_found("category", name));
        }
        Ok(())
    }

    /// Move every page of `source` into `destination` and delete `source`.
    ///
    /// Returns the destination with the union of both page lists, each page
    /// once.
    pub async fn merge(
        db: &CommandExecutor,
        source: &str,
        destination: &str,
    ) -> DbResult<Category> {
        if source == destination {
            return Err(CoreError::Validation(format!(
                "Cannot merge category '{source}' into itself"
            ))
            .into());
        }

        let mut tx = TransactionGuard::begin(db, "merge_categories").await?;
        for name in [source, destination] {
            let found = tx
                .scalar(
                    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE name = ?1")
                        .bind(name),
                )
                .await?
                .unwrap_or(0);
            if found == 0 {
                return Err(DbError::not_found("category", name));
            }
        }

        // Pages bound to both would collide with the destination binding.
        tx.execute(
            sqlx::query(
                "DELETE FROM category_bindings
                 WHERE category = ?1
                   AND page IN (SELECT page FROM category_bindings WHERE category = ?2)",
            )
            .bind(source)
            .bind(destination),
        )
        .await?;
        tx.execute(
            sqlx::query("UPDATE category_bindings SET category = ?2 WHERE category = ?1")
                .bind(source)
                .bind(destination),
        )
        .await?;
        tx.execute_expecting(
            sqlx::query("DELETE FROM categories WHERE name = ?1").bind(source),
            1,
        )
        .await?;
        let pages = tx
            .fetch_all(
                sqlx::query_as::<_, (String,)>(
                    "SELECT page FROM category_bindings WHERE category = ?1 ORDER BY page ASC",
                )
                .bind(destination),
            )
            .await?;
        tx.commit_if(Expect::AtLeast(1)).await?;

        tracing::debug!(source = "category_repo", from = source, into = destination, "Categories merged");
        Ok(Category {
            name: destination.to_string(),
            pages: pages.into_iter().map(|(page,)| page).collect(),
        })
    }

    /// Replace every binding of `page` with one binding per category.
    ///
    /// An unknown category rolls the whole rebind back.
    pub async fn rebind(db: &CommandExecutor, page: &str, categories: &[&str]) -> DbResult<()> {
        let mut tx = TransactionGuard::begin(db, "rebind_page").await?;
        tx.execute(sqlx::query("DELETE FROM category_bindings WHERE page = ?1").bind(page))
            .await?;
        for category in categories {
            tx.execute_expecting(
                sqlx::query("INSERT INTO category_bindings (category, page) VALUES (?1, ?2)")
                    .bind(*category)
                    .bind(page),
                1,
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn pages_of(db: &CommandExecutor, category: &str) -> DbResult<Vec<String>> {
        db.fetch_all(
            "category_pages",
            sqlx::query_as::<_, (String,)>(
                "SELECT page FROM category_bindings WHERE category = ?1 ORDER BY page ASC",
            )
            .bind(category),
        )
        .await
        .map(|rows| rows.into_iter().map(|(page,)| page).collect())
    }
}
