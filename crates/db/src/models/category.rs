//! Category model.

use serde::Serialize;

/// A category together with the names of the pages bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    /// Bound page names, sorted.
    pub pages: Vec<String>,
}
