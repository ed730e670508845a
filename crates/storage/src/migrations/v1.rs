//! Migration v1: initial schema — `queue_items`, `topics`, `fingerprint_cache`.
//!
//! `queue_items` uses the two-column title form (`original_title` +
//! `current_title`) for all new deployments; legacy single-column databases
//! are detected and handled separately (see `column_helpers` and `Store::open`).

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS queue_items (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    original_title  TEXT NOT NULL,
    current_title   TEXT,
    state           TEXT NOT NULL DEFAULT 'pending',
    error_message   TEXT,
    retry_count     INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_queue_items_original_title_active
    ON queue_items(original_title)
    WHERE state != 'failed';

CREATE INDEX IF NOT EXISTS idx_queue_items_state_created
    ON queue_items(state, created_at);

CREATE TABLE IF NOT EXISTS topics (
    id                INTEGER PRIMARY KEY,
    queue_item_id     INTEGER NOT NULL UNIQUE REFERENCES queue_items(id),
    title             TEXT NOT NULL,
    description       TEXT NOT NULL,
    category          TEXT NOT NULL,
    tags              TEXT NOT NULL DEFAULT '[]',
    technologies      TEXT NOT NULL DEFAULT '[]',
    complexity_level  TEXT NOT NULL,
    extra             TEXT NOT NULL DEFAULT '{}',
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_topics_category ON topics(category);

CREATE TABLE IF NOT EXISTS fingerprint_cache (
    key         TEXT PRIMARY KEY,
    value       BLOB NOT NULL,
    created_at  TEXT NOT NULL
);
";
