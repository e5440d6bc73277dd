//! Integration tests for the category index.
//!
//! - Add, rename and remove with cascading bindings
//! - Merge de-duplicates pages bound to both categories
//! - Rebind replaces a page's bindings atomically

mod common;

use assert_matches::assert_matches;
use wikistore_core::error::CoreError;
use wikistore_db::error::DbError;
use wikistore_db::executor::CommandExecutor;
use wikistore_db::repositories::{CategoryRepo, PageRepo};

use common::{at, open_store};

async fn seed_pages(db: &CommandExecutor, names: &[&str]) {
    for name in names {
        PageRepo::add(db, name, at(1, 9)).await.unwrap();
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_find_category() {
    let (_dir, store) = open_store().await;
    let db = store.executor();

    let category = CategoryRepo::add(db, "Guides").await.unwrap();
    assert!(category.pages.is_empty());
    assert_eq!(CategoryRepo::find(db, "Guides").await.unwrap(), Some(category));
    assert_eq!(CategoryRepo::find(db, "Other").await.unwrap(), None);

    assert_matches!(
        CategoryRepo::add(db, "Guides").await,
        Err(DbError::Constraint { .. })
    );
}

#[tokio::test]
async fn list_includes_empty_categories() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    seed_pages(db, &["B", "A"]).await;
    CategoryRepo::add(db, "Zed").await.unwrap();
    CategoryRepo::add(db, "Alpha").await.unwrap();
    CategoryRepo::rebind(db, "B", &["Alpha"]).await.unwrap();
    CategoryRepo::rebind(db, "A", &["Alpha"]).await.unwrap();

    let categories = CategoryRepo::list(db).await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Alpha");
    assert_eq!(categories[0].pages, ["A", "B"]);
    assert_eq!(categories[1].name, "Zed");
    assert!(categories[1].pages.is_empty());
}

#[tokio::test]
async fn rename_keeps_bindings() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    seed_pages(db, &["Home"]).await;
    CategoryRepo::add(db, "Docs").await.unwrap();
    CategoryRepo::rebind(db, "Home", &["Docs"]).await.unwrap();

    let renamed = CategoryRepo::rename(db, "Docs", "Manual").await.unwrap();

    assert_eq!(renamed.pages, ["Home"]);
    assert_eq!(CategoryRepo::categories_for_page(db, "Home").await.unwrap(), ["Manual"]);
    assert_matches!(
        CategoryRepo::rename(db, "Docs", "Again").await,
        Err(DbError::NotFound { entity: "category", .. })
    );
}

#[tokio::test]
async fn remove_drops_bindings_but_keeps_pages() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    seed_pages(db, &["Home"]).await;
    CategoryRepo::add(db, "Docs").await.unwrap();
    CategoryRepo::rebind(db, "Home", &["Docs"]).await.unwrap();

    CategoryRepo::remove(db, "Docs").await.unwrap();

    assert!(PageRepo::exists(db, "Home").await.unwrap());
    assert!(CategoryRepo::categories_for_page(db, "Home").await.unwrap().is_empty());
}

#[tokio::test]
async fn page_rename_and_removal_cascade_to_bindings() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    seed_pages(db, &["Home", "Other"]).await;
    CategoryRepo::add(db, "Docs").await.unwrap();
    CategoryRepo::rebind(db, "Home", &["Docs"]).await.unwrap();
    CategoryRepo::rebind(db, "Other", &["Docs"]).await.unwrap();

    PageRepo::rename(db, "Home", "Start").await.unwrap();
    PageRepo::remove(db, "Other").await.unwrap();

    let docs = CategoryRepo::find(db, "Docs").await.unwrap().unwrap();
    assert_eq!(docs.pages, ["Start"]);
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn merge_unions_pages_without_duplicates() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    seed_pages(db, &["A", "B", "C"]).await;
    CategoryRepo::add(db, "Old").await.unwrap();
    CategoryRepo::add(db, "New").await.unwrap();
    CategoryRepo::rebind(db, "A", &["Old"]).await.unwrap();
    CategoryRepo::rebind(db, "B", &["Old", "New"]).await.unwrap();
    CategoryRepo::rebind(db, "C", &["New"]).await.unwrap();

    let merged = CategoryRepo::merge(db, "Old", "New").await.unwrap();

    assert_eq!(merged.name, "New");
    assert_eq!(merged.pages, ["A", "B", "C"]);
    assert_eq!(CategoryRepo::find(db, "Old").await.unwrap(), None);
    assert_eq!(CategoryRepo::find(db, "New").await.unwrap(), Some(merged));
    assert_eq!(CategoryRepo::categories_for_page(db, "B").await.unwrap(), ["New"]);
}

#[tokio::test]
async fn merge_requires_two_existing_categories() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    CategoryRepo::add(db, "Docs").await.unwrap();

    assert_matches!(
        CategoryRepo::merge(db, "Docs", "Docs").await,
        Err(DbError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        CategoryRepo::merge(db, "Docs", "Missing").await,
        Err(DbError::NotFound { .. })
    );
    assert_matches!(
        CategoryRepo::merge(db, "Missing", "Docs").await,
        Err(DbError::NotFound { .. })
    );
    assert!(CategoryRepo::find(db, "Docs").await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Rebind
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rebind_replaces_all_bindings() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    seed_pages(db, &["Home"]).await;
    for name in ["A", "B", "C"] {
        CategoryRepo::add(db, name).await.unwrap();
    }

    CategoryRepo::rebind(db, "Home", &["A", "B"]).await.unwrap();
    CategoryRepo::rebind(db, "Home", &["C"]).await.unwrap();
    assert_eq!(CategoryRepo::categories_for_page(db, "Home").await.unwrap(), ["C"]);

    CategoryRepo::rebind(db, "Home", &[]).await.unwrap();
    assert!(CategoryRepo::categories_for_page(db, "Home").await.unwrap().is_empty());
}

#[tokio::test]
async fn rebind_to_unknown_category_rolls_back() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    seed_pages(db, &["Home"]).await;
    CategoryRepo::add(db, "A").await.unwrap();
    CategoryRepo::rebind(db, "Home", &["A"]).await.unwrap();

    let result = CategoryRepo::rebind(db, "Home", &["A", "Ghost"]).await;

    assert_matches!(result, Err(DbError::Constraint { .. }));
    assert_eq!(CategoryRepo::categories_for_page(db, "Home").await.unwrap(), ["A"]);
}
