//! SQLite schema for the record store.
//!
//! - `records` holds every orderable record: its content type, lifecycle
//!   status, manual position (`menu_order`) and optional parent
//! - `store_meta` mirrors the schema version for tooling that does not read
//!   `PRAGMA user_version`

/// Migration v1: records table plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS records (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_type TEXT NOT NULL CHECK (length(trim(record_type)) > 0),
    title TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL CHECK (length(trim(status)) > 0),
    menu_order INTEGER NOT NULL DEFAULT 0,
    parent_id INTEGER REFERENCES records(record_id) ON DELETE SET NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (parent_id IS NULL OR parent_id <> record_id)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (id, schema_version, created_at_us)
VALUES (1, 1, 0);
";

/// Migration v2: sibling-walk and descendant lookup indexes.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_records_type_parent_order
    ON records(record_type, parent_id, menu_order, title);

CREATE INDEX IF NOT EXISTS idx_records_parent_status
    ON records(parent_id, status);

CREATE INDEX IF NOT EXISTS idx_records_type_status
    ON records(record_type, status);
";

/// Indexes expected after all migrations have run.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_records_type_parent_order",
    "idx_records_parent_status",
    "idx_records_type_status",
];
