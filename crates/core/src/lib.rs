pub mod error;
pub mod message_tree;
pub mod page;
pub mod schema_version;
pub mod types;
pub mod validation;
