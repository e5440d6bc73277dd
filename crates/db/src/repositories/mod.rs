//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept the store's `&CommandExecutor` as the first argument. Operations
//! made of several statements run inside a `TransactionGuard` and are
//! all-or-nothing.

pub mod category_repo;
pub mod message_repo;
pub mod navigation_path_repo;
pub mod page_content_repo;
pub mod page_repo;
pub mod snippet_repo;

pub use category_repo::CategoryRepo;
pub use message_repo::MessageRepo;
pub use navigation_path_repo::NavigationPathRepo;
pub use page_content_repo::PageContentRepo;
pub use page_repo::PageRepo;
pub use snippet_repo::SnippetRepo;
