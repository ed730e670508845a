//! Queue item operations: enqueue, claim, complete, fail, requeue, reset-stale, lookups.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use topicforge_core::{QueueItem, QueueItemState, StateCounts};

use super::{get_conn, Store};
use crate::error::StorageError;
use crate::retry::with_busy_retry;

fn row_to_queue_item(row: &Row) -> rusqlite::Result<QueueItem> {
    let state_str: String = row.get(3)?;
    let state = state_str.parse::<QueueItemState>().unwrap_or(QueueItemState::Pending);
    Ok(QueueItem {
        id: row.get(0)?,
        original_title: row.get(1)?,
        current_title: row.get(2)?,
        state,
        error_message: row.get(4)?,
        retry_count: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, original_title, current_title, state, error_message, retry_count, created_at, updated_at";

/// Same projection over the legacy single-column schema: `title` stands in
/// for `original_title`, and `current_title` is always absent (aliased to
/// `NULL`) since the legacy table has no such column.
const LEGACY_SELECT_COLUMNS: &str =
    "id, title, NULL, state, error_message, retry_count, created_at, updated_at";

impl Store {
    fn select_columns(&self) -> &'static str {
        if self.legacy_schema { LEGACY_SELECT_COLUMNS } else { SELECT_COLUMNS }
    }

    /// Column the Store writes to for a freshly-submitted title: `title` on a
    /// legacy database, `original_title` on the current schema.
    fn title_column(&self) -> &'static str {
        if self.legacy_schema { "title" } else { "original_title" }
    }

    /// Inserts a new queue item for `original_title`, or returns the id of an
    /// existing non-failed row. A `failed` row for the same title is reused:
    /// reset to `pending` with its error cleared, keeping the same id (see
    /// `DESIGN.md`, open question on failed-row resubmission).
    ///
    /// Returns `(id, created)` where `created` is `false` whenever an
    /// existing row (active or reused-failed) answered the call.
    pub fn enqueue(&self, original_title: &str) -> Result<(i64, bool), StorageError> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();

        if self.legacy_schema {
            return Self::enqueue_legacy(&conn, original_title, now);
        }

        // Single atomic upsert against `idx_queue_items_original_title_active`:
        // two callers racing to submit the same brand-new title both reach
        // this statement, and SQLite — not a prior SELECT — decides which one
        // inserts and which one no-ops, so there's no window for both to pass
        // an existence check and for the second to hit a hard constraint error.
        let inserted = with_busy_retry(|| {
            conn.execute(
                "INSERT INTO queue_items
                 (original_title, current_title, state, error_message, retry_count, created_at, updated_at)
                 VALUES (?1, NULL, 'pending', NULL, 0, ?2, ?2)
                 ON CONFLICT(original_title) WHERE state != 'failed' DO NOTHING",
                params![original_title, now],
            )
        })?;

        let columns = self.select_columns();
        let title_column = self.title_column();
        // The partial index excludes `failed` rows, so a title whose only
        // prior row is `failed` doesn't conflict with the INSERT above — both
        // rows now exist. Prefer the non-failed one when picking which to read.
        let existing = conn
            .query_row(
                &format!(
                    "SELECT {columns} FROM queue_items WHERE {title_column} = ?1
                     ORDER BY (state = 'failed'), id DESC"
                ),
                params![original_title],
                row_to_queue_item,
            )
            .map_err(StorageError::from)?;

        if inserted > 0 {
            return Ok((existing.id, true));
        }
        if matches!(existing.state, QueueItemState::Failed) {
            with_busy_retry(|| {
                conn.execute(
                    "UPDATE queue_items
                     SET state = 'pending', error_message = NULL, retry_count = 0, updated_at = ?1
                     WHERE id = ?2",
                    params![now, existing.id],
                )
            })?;
        }
        Ok((existing.id, false))
    }

    /// Legacy single-column (`title`) schema carries no unique constraint to
    /// upsert against, so this path keeps the lookup-then-write shape the
    /// current schema no longer needs.
    fn enqueue_legacy(
        conn: &rusqlite::Connection,
        original_title: &str,
        now: chrono::DateTime<Utc>,
    ) -> Result<(i64, bool), StorageError> {
        if let Some(existing) = conn
            .query_row(
                &format!("SELECT {LEGACY_SELECT_COLUMNS} FROM queue_items WHERE title = ?1"),
                params![original_title],
                row_to_queue_item,
            )
            .optional()
            .map_err(StorageError::from)?
        {
            if matches!(existing.state, QueueItemState::Failed) {
                with_busy_retry(|| {
                    conn.execute(
                        "UPDATE queue_items
                         SET state = 'pending', error_message = NULL, retry_count = 0, updated_at = ?1
                         WHERE id = ?2",
                        params![now, existing.id],
                    )
                })?;
            }
            return Ok((existing.id, false));
        }

        let id = with_busy_retry(|| {
            conn.execute(
                "INSERT INTO queue_items
                 (title, state, error_message, retry_count, created_at, updated_at)
                 VALUES (?1, 'pending', NULL, 0, ?2, ?2)",
                params![original_title, now],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        Ok((id, true))
    }

    /// Atomically claims up to `limit` pending items (FIFO by `created_at`)
    /// and transitions them to `processing`. The select-and-update is a
    /// single `UPDATE ... RETURNING` statement so two concurrent callers
    /// never claim the same row.
    pub fn claim_pending(&self, limit: usize) -> Result<Vec<QueueItem>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        let columns = self.select_columns();

        with_busy_retry(|| {
            let mut stmt = conn.prepare(&format!(
                "UPDATE queue_items
                 SET state = 'processing', updated_at = ?1
                 WHERE id IN (
                     SELECT id FROM queue_items
                     WHERE state = 'pending'
                     ORDER BY created_at ASC
                     LIMIT ?2
                 )
                 RETURNING {columns}"
            ))?;
            let items = stmt
                .query_map(params![now, limit as i64], row_to_queue_item)?
                .filter_map(|r| match r {
                    Ok(item) => Some(item),
                    Err(e) => {
                        tracing::warn!("row read error while claiming pending items: {e}");
                        None
                    },
                })
                .collect();
            Ok(items)
        })
    }

    /// Transactionally completes an item: updates it to `completed` with the
    /// cleaned title, and inserts its `Topic` row. Both writes succeed or
    /// both roll back. Returns `StorageError::NotFound` if `id` doesn't exist.
    pub fn complete(
        &self,
        id: i64,
        current_title: &str,
        description: &str,
        category: &str,
        tags: &[String],
        technologies: &[String],
        complexity_level: &str,
        extra: &serde_json::Value,
    ) -> Result<(), StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let now = Utc::now();
        let tags_json = serde_json::to_string(tags)?;
        let technologies_json = serde_json::to_string(technologies)?;
        let extra_json = serde_json::to_string(extra)?;
        // A legacy database has no `current_title` column; the cleaned title
        // still reaches the Topic row below, it just isn't mirrored onto the
        // queue_items row itself (see Store::open's legacy_schema detection).
        let update_sql = if self.legacy_schema {
            "UPDATE queue_items SET state = 'completed', updated_at = ?2 WHERE id = ?3"
        } else {
            "UPDATE queue_items SET state = 'completed', current_title = ?1, updated_at = ?2 WHERE id = ?3"
        };

        let found = with_busy_retry(|| {
            let tx = conn.transaction()?;
            let updated = tx.execute(update_sql, params![current_title, now, id])?;
            if updated == 0 {
                // No such queue item; roll back and report via the typed error
                // below rather than committing a no-op transaction.
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO topics
                 (id, queue_item_id, title, description, category, tags, technologies,
                  complexity_level, extra, created_at)
                 VALUES (?1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(queue_item_id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    category = excluded.category,
                    tags = excluded.tags,
                    technologies = excluded.technologies,
                    complexity_level = excluded.complexity_level,
                    extra = excluded.extra",
                params![
                    id,
                    current_title,
                    description,
                    category,
                    tags_json,
                    technologies_json,
                    complexity_level,
                    extra_json,
                    now
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })?;

        if found {
            Ok(())
        } else {
            Err(StorageError::NotFound { entity: "queue_item", id: id.to_string() })
        }
    }

    /// Transitions an item straight to `failed` with the given diagnostic.
    /// Does not touch `retry_count` (that only changes via `requeue_transient`).
    pub fn fail(&self, id: i64, error_message: &str) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        with_busy_retry(|| {
            conn.execute(
                "UPDATE queue_items SET state = 'failed', error_message = ?1, updated_at = ?2 WHERE id = ?3",
                params![error_message, now, id],
            )
        })?;
        Ok(())
    }

    /// Increments `retry_count`; if still under `max_retry`, transitions back
    /// to `pending` (clearing `error_message`); otherwise transitions to
    /// `failed` with the error recorded.
    pub fn requeue_transient(
        &self,
        id: i64,
        error_message: &str,
        max_retry: i32,
    ) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        with_busy_retry(|| {
            conn.execute(
                "UPDATE queue_items
                 SET retry_count = retry_count + 1,
                     state = CASE WHEN retry_count + 1 >= ?1 THEN 'failed' ELSE 'pending' END,
                     error_message = CASE WHEN retry_count + 1 >= ?1 THEN ?2 ELSE NULL END,
                     updated_at = ?3
                 WHERE id = ?4",
                params![max_retry, error_message, now, id],
            )
        })?;
        Ok(())
    }

    /// Transitions `processing` items whose `updated_at` is older than
    /// `older_than_secs` ago back to `pending`. `older_than_secs = 0` resets
    /// every `processing` item unconditionally, used on graceful shutdown.
    pub fn reset_stale(&self, older_than_secs: i64) -> Result<usize, StorageError> {
        let conn = get_conn(&self.pool)?;
        let threshold = Utc::now() - chrono::Duration::seconds(older_than_secs);
        let now = Utc::now();
        with_busy_retry(|| {
            conn.execute(
                "UPDATE queue_items SET state = 'pending', updated_at = ?1
                 WHERE state = 'processing' AND updated_at <= ?2",
                params![now, threshold],
            )
        })
        .map_err(StorageError::from)
    }

    /// Looks up a queue item by its exact `original_title`.
    pub fn lookup_by_title(&self, original_title: &str) -> Result<Option<QueueItem>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let columns = self.select_columns();
        let title_column = self.title_column();
        conn.query_row(
            &format!("SELECT {columns} FROM queue_items WHERE {title_column} = ?1"),
            params![original_title],
            row_to_queue_item,
        )
        .optional()
        .map_err(StorageError::from)
    }

    /// Per-state item counts, for the processing-status API.
    pub fn count_by_state(&self) -> Result<StateCounts, StorageError> {
        let conn = get_conn(&self.pool)?;
        let (pending, processing, completed, failed): (i64, i64, i64, i64) = conn.query_row(
            "SELECT
                SUM(CASE WHEN state = 'pending' THEN 1 ELSE 0 END),
                SUM(CASE WHEN state = 'processing' THEN 1 ELSE 0 END),
                SUM(CASE WHEN state = 'completed' THEN 1 ELSE 0 END),
                SUM(CASE WHEN state = 'failed' THEN 1 ELSE 0 END)
             FROM queue_items",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        Ok(StateCounts {
            pending: pending as u64,
            processing: processing as u64,
            completed: completed as u64,
            failed: failed as u64,
        })
    }

    /// Most-recently-failed items, newest first, for the status API.
    pub fn recent_failures(&self, limit: usize) -> Result<Vec<QueueItem>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let columns = self.select_columns();
        let mut stmt = conn.prepare(&format!(
            "SELECT {columns} FROM queue_items
             WHERE state = 'failed'
             ORDER BY updated_at DESC
             LIMIT ?1"
        ))?;
        let items = stmt
            .query_map(params![limit as i64], row_to_queue_item)?
            .filter_map(|r| match r {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("row read error while reading recent failures: {e}");
                    None
                },
            })
            .collect();
        Ok(items)
    }
}
