//! Shared fixtures for the store integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use wikistore_core::types::Timestamp;
use wikistore_db::models::page_content::ContentEdit;
use wikistore_db::PagesStore;

/// Open a fresh store backed by a file in its own temporary directory.
///
/// The directory must outlive the store, so both are returned.
pub async fn open_store() -> (TempDir, PagesStore) {
    let dir = TempDir::new().unwrap();
    let store = PagesStore::init("Data Source=wiki.db", dir.path())
        .await
        .unwrap();
    (dir, store)
}

/// A whole-second UTC timestamp on 2024-03-`day`.
pub fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

pub fn edit(title: &str, content: &str) -> ContentEdit {
    ContentEdit {
        title: title.to_string(),
        username: "alice".to_string(),
        modified_at: at(2, 12),
        comment: String::new(),
        content: content.to_string(),
    }
}
