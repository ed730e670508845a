#![allow(
    clippy::redundant_pub_crate,
    reason = "migrations module is private, pub(crate) is intentional"
)]

mod column_helpers;
mod v1;

pub(crate) use column_helpers::column_exists;
use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 1;

/// Applies every migration up to `SCHEMA_VERSION` and sets the pragmas the
/// rest of the store depends on (WAL mode, a server-side busy timeout).
///
/// A pre-existing legacy `queue_items(id, title, ...)` table (single-column
/// title) is left untouched here: this runner only ever adds the two-column
/// form going forward, matching the teacher's `add_column_if_not_exists`
/// idiom of additive-only migrations. Schema-shape detection for reads/writes
/// happens in `Store::open`, not here.
pub fn run_migrations(conn: &Connection, busy_timeout_secs: u64) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "busy_timeout", (busy_timeout_secs * 1000) as i64)?;

    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!(current_version, target = SCHEMA_VERSION, "checking database schema version");

    if current_version < 1 {
        tracing::info!("running migration v1: initial schema");
        conn.execute_batch(v1::SQL)?;
    }

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tracing::info!(version = SCHEMA_VERSION, "database schema up to date");

    Ok(())
}
