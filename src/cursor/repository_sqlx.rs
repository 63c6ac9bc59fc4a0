use anyhow::Result;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};

use crate::cursor::EventCursor;
use crate::cursor::repository::CursorRepository;

/// SQLx-backed cursor store. One row per stream; the non-decreasing
/// invariant is enforced in SQL so concurrent advances cannot regress it.
pub struct SqlxCursorRepository {
    pool: AnyPool,
}

impl SqlxCursorRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CursorRepository for SqlxCursorRepository {
    async fn get(&self, stream: &str) -> Result<EventCursor> {
        let row = sqlx::query(
            r#"SELECT last_event_id, last_seen_ms FROM event_cursors WHERE stream = ?;"#,
        )
        .bind(stream)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(EventCursor {
                stream: stream.to_string(),
                last_event_id: r.try_get::<Option<i64>, _>("last_event_id")?,
                last_seen_ms: r.try_get::<Option<i64>, _>("last_seen_ms")?,
            }),
            None => Ok(EventCursor::empty(stream)),
        }
    }

    async fn advance(&self, stream: &str, last_event_id: i64, last_seen_ms: i64) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO event_cursors (stream, last_event_id, last_seen_ms)
VALUES (?, ?, ?)
ON CONFLICT(stream) DO UPDATE SET
  last_event_id = MAX(COALESCE(event_cursors.last_event_id, 0), excluded.last_event_id),
  last_seen_ms = MAX(COALESCE(event_cursors.last_seen_ms, 0), excluded.last_seen_ms);
"#,
        )
        .bind(stream)
        .bind(last_event_id)
        .bind(last_seen_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
