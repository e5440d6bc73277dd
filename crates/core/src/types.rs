/// Message identifiers are SQLite `INTEGER PRIMARY KEY AUTOINCREMENT` values.
pub type MessageId = i64;

/// Revision numbers of page content rows.
pub type Revision = i32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
