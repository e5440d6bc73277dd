//! Navigation path model.

use serde::Serialize;

/// A named, ordered sequence of page references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationPath {
    pub name: String,
    /// Page names in position order. The same page may appear more than once.
    pub pages: Vec<String>,
}
