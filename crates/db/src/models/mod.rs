//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Plain value records returned by the repositories (no live handles)
//! - `Deserialize` DTOs for writes where an operation takes several fields

pub mod category;
pub mod message;
pub mod navigation_path;
pub mod page;
pub mod page_content;
pub mod snippet;
