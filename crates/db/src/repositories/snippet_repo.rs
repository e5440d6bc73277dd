//! Repository for the `snippets` table.

use wikistore_core::validation::validate_name;

use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::models::snippet::Snippet;

/// Provides CRUD operations for snippets.
pub struct SnippetRepo;

impl SnippetRepo {
    /// All snippets, ordered by name.
    pub async fn list(db: &CommandExecutor) -> DbResult<Vec<Snippet>> {
        db.fetch_all(
            "list_snippets",
            sqlx::query_as::<_, Snippet>("SELECT name, content FROM snippets ORDER BY name ASC"),
        )
        .await
    }

    pub async fn find(db: &CommandExecutor, name: &str) -> DbResult<Option<Snippet>> {
        db.fetch_optional(
            "find_snippet",
            sqlx::query_as::<_, Snippet>("SELECT name, content FROM snippets WHERE name = ?1").bind(name),
        )
        .await
    }

    /// Insert a snippet. Fails with a constraint error on a duplicate name.
    pub async fn add(db: &CommandExecutor, name: &str, content: &str) -> DbResult<Snippet> {
        validate_name("Snippet", name)?;
        db.execute_expecting(
            "add_snippet",
            sqlx::query("INSERT INTO snippets (name, content) VALUES (?1, ?2)")
                .bind(name)
                .bind(content),
            1,
        )
        .await?;
        Ok(Snippet {
            name: name.to_string(),
            content: content.to_string(),
        })
    }

    pub async fn modify(db: &CommandExecutor, name: &str, content: &str) -> DbResult<Snippet> {
        db.fetch_optional(
            "modify_snippet",
            sqlx::query_as::<_, Snippet>(
                "UPDATE snippets SET content = ?1 WHERE name = ?2 RETURNING name, content",
            )
            .bind(content)
            .bind(name),
        )
        .await?
        .ok_or_else(|| DbError::not_found("snippet", name))
    }

    pub async fn remove(db: &CommandExecutor, name: &str) -> DbResult<()> {
        let affected = db
            .execute(
                "remove_snippet",
                sqlx::query("DELETE FROM snippets WHERE name = ?1").bind(name),
            )
            .await?;
        if affected == 0 {
            return Err(DbError::not_found("snippet", name));
        }
        Ok(())
    }
}
