//! Persisted layout of the pages subsystem.
//!
//! The pages subsystem keeps its own version table so that other subsystems
//! sharing the same database can be versioned independently.

use crate::migrations::{Migration, SchemaDefinition};

/// Schema version written by this build of the engine.
pub const CURRENT_VERSION: &str = "1.3";

/// Version assumed for a store created before versioning existed.
pub const LEGACY_VERSION: &str = "1.0";

/// Version table of the pages subsystem.
pub const VERSION_TABLE: &str = "pages_provider_version";

const CREATE_STATEMENTS: &[&str] = &[
    "CREATE TABLE pages_provider_version (
        version TEXT NOT NULL PRIMARY KEY
    )",
    "CREATE TABLE pages (
        name       TEXT NOT NULL PRIMARY KEY,
        status     TEXT NOT NULL DEFAULT 'N' CHECK (status IN ('N', 'L', 'P')),
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE page_contents (
        page        TEXT    NOT NULL REFERENCES pages (name) ON UPDATE CASCADE ON DELETE CASCADE,
        revision    INTEGER NOT NULL,
        title       TEXT    NOT NULL,
        modified_at TEXT    NOT NULL,
        username    TEXT    NOT NULL,
        content     TEXT    NOT NULL,
        comment     TEXT    NOT NULL,
        PRIMARY KEY (page, revision)
    )",
    "CREATE TABLE categories (
        name TEXT NOT NULL PRIMARY KEY
    )",
    "CREATE TABLE category_bindings (
        category TEXT NOT NULL REFERENCES categories (name) ON UPDATE CASCADE ON DELETE CASCADE,
        page     TEXT NOT NULL REFERENCES pages (name) ON UPDATE CASCADE ON DELETE CASCADE,
        PRIMARY KEY (category, page)
    )",
    "CREATE TABLE messages (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        page      TEXT    NOT NULL REFERENCES pages (name) ON UPDATE CASCADE ON DELETE CASCADE,
        parent    INTEGER NOT NULL DEFAULT -1,
        username  TEXT    NOT NULL,
        posted_at TEXT    NOT NULL,
        subject   TEXT    NOT NULL,
        body      TEXT    NOT NULL
    )",
    "CREATE INDEX idx_messages_page_parent ON messages (page, parent)",
    "CREATE TABLE snippets (
        name    TEXT NOT NULL PRIMARY KEY,
        content TEXT NOT NULL
    )",
    "CREATE TABLE navigation_paths (
        name TEXT NOT NULL PRIMARY KEY
    )",
    "CREATE TABLE navigation_path_bindings (
        navigation_path TEXT    NOT NULL REFERENCES navigation_paths (name) ON UPDATE CASCADE ON DELETE CASCADE,
        page            TEXT    NOT NULL REFERENCES pages (name) ON UPDATE CASCADE ON DELETE CASCADE,
        position        INTEGER NOT NULL,
        PRIMARY KEY (navigation_path, page, position)
    )",
];

// Upgrade edges carry only the version bump; statements go here when a
// version changes the layout.
const MIGRATIONS: &[Migration] = &[
    Migration {
        from: "1.0",
        to: "1.1",
        statements: &[],
    },
    Migration {
        from: "1.1",
        to: "1.2",
        statements: &[],
    },
    Migration {
        from: "1.2",
        to: "1.3",
        statements: &[],
    },
];

/// The pages subsystem.
pub const PAGES_SCHEMA: SchemaDefinition = SchemaDefinition {
    subsystem: "pages",
    version_table: VERSION_TABLE,
    probe_table: "pages",
    current_version: CURRENT_VERSION,
    legacy_version: LEGACY_VERSION,
    create_statements: CREATE_STATEMENTS,
    migrations: MIGRATIONS,
};
