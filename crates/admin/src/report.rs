//! Status report of an initialized store.

use serde::Serialize;
use wikistore_core::page::PageStatus;
use wikistore_db::error::DbResult;
use wikistore_db::repositories::{
    CategoryRepo, MessageRepo, NavigationPathRepo, PageContentRepo, PageRepo, SnippetRepo,
};
use wikistore_db::{PagesStore, ProviderInfo};

#[derive(Debug, Serialize)]
pub struct StoreReport {
    pub provider: ProviderInfo,
    pub stored_version: Option<String>,
    pub pages: Vec<PageSummary>,
    pub categories: usize,
    pub navigation_paths: usize,
    pub snippets: usize,
}

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub name: String,
    pub status: PageStatus,
    pub title: Option<String>,
    pub backups: usize,
    pub messages: i64,
}

/// Collect a report by walking every page of the store.
pub async fn collect(store: &PagesStore) -> DbResult<StoreReport> {
    let db = store.executor();

    let mut pages = Vec::new();
    for page in PageRepo::list(db).await? {
        let content = PageContentRepo::get_content(db, &page.name).await?;
        let backups = PageContentRepo::get_backups(db, &page.name).await?;
        let messages = MessageRepo::count(db, &page.name).await?;
        pages.push(PageSummary {
            title: content.map(|c| c.title),
            backups: backups.len(),
            messages,
            name: page.name,
            status: page.status,
        });
    }

    Ok(StoreReport {
        provider: PagesStore::information(),
        stored_version: store.schema_version().await?,
        pages,
        categories: CategoryRepo::list(db).await?.len(),
        navigation_paths: NavigationPathRepo::list(db).await?.len(),
        snippets: SnippetRepo::list(db).await?.len(),
    })
}
