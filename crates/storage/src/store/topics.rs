//! Read-only topic listing, backing `GET /topics`.

use rusqlite::{params, Row};
use topicforge_core::{PaginatedTopics, Topic};

use super::{get_conn, Store};
use crate::error::StorageError;

fn row_to_topic(row: &Row) -> rusqlite::Result<Topic> {
    let tags_json: String = row.get(5)?;
    let technologies_json: String = row.get(6)?;
    let extra_json: String = row.get(8)?;
    Ok(Topic {
        id: row.get(0)?,
        queue_item_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        technologies: serde_json::from_str(&technologies_json).unwrap_or_default(),
        complexity_level: row.get(7)?,
        extra: serde_json::from_str(&extra_json).unwrap_or(serde_json::Value::Null),
        created_at: row.get(9)?,
    })
}

const SELECT_COLUMNS: &str = "id, queue_item_id, title, description, category, tags, \
                               technologies, complexity_level, extra, created_at";

impl Store {
    /// Lists topics, optionally filtered by `category`, newest first.
    pub fn list_topics(
        &self,
        category: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedTopics, StorageError> {
        let conn = get_conn(&self.pool)?;
        let offset = page.saturating_sub(1) * page_size;

        let total: i64 = match category {
            Some(c) => conn.query_row(
                "SELECT COUNT(*) FROM topics WHERE category = ?1",
                params![c],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM topics", [], |row| row.get(0))?,
        };

        let items = match category {
            Some(c) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM topics WHERE category = ?1
                     ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
                ))?;
                stmt.query_map(params![c, page_size as i64, offset as i64], row_to_topic)?
                    .filter_map(Result::ok)
                    .collect()
            },
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM topics
                     ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
                ))?;
                stmt.query_map(params![page_size as i64, offset as i64], row_to_topic)?
                    .filter_map(Result::ok)
                    .collect()
            },
        };

        Ok(PaginatedTopics { items, total: total as u64, page, page_size })
    }
}
