use anyhow::Result;
use async_trait::async_trait;

use crate::cursor::EventCursor;

#[async_trait]
pub trait CursorRepository: Send + Sync {
    async fn get(&self, stream: &str) -> Result<EventCursor>;

    /// Advances the cursor, clamped so it never moves backwards. Called
    /// once per cycle, after every yielded event has been processed.
    async fn advance(&self, stream: &str, last_event_id: i64, last_seen_ms: i64) -> Result<()>;
}
