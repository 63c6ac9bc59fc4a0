//! Incremental-poll cursors.
//!
//! The upstream feeds are append-only and monotonically id'd but only
//! readable newest-first in a bounded window. Each poller keeps one named
//! cursor row; streams are keyed independently so the pollers never
//! contend on the same row.

pub mod repository;
pub mod repository_sqlx;

/// Persisted high-water-mark for one upstream stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventCursor {
    pub stream: String,
    pub last_event_id: Option<i64>,
    pub last_seen_ms: Option<i64>,
}

impl EventCursor {
    pub fn empty(stream: &str) -> Self {
        Self {
            stream: stream.to_string(),
            last_event_id: None,
            last_seen_ms: None,
        }
    }
}

/// Anything a cursor can walk: an id when the upstream assigns one, plus a
/// timestamp fallback.
pub trait FeedEvent {
    fn event_id(&self) -> Option<i64>;
    fn occurred_ms(&self) -> i64;
}

/// Filters a newest-first page down to unseen events and yields them in
/// ascending order so downstream processing and cursor advancement stay
/// monotonic.
///
/// Known limitation: if the gap between the cursor and the feed's head is
/// deeper than one upstream page, the overflow is silently skipped. The
/// upstream only exposes a fixed recent window, so there is nothing to
/// paginate into.
pub fn filter_ascending<E: FeedEvent>(page: Vec<E>, cursor: &EventCursor) -> Vec<E> {
    let mut fresh: Vec<E> = page
        .into_iter()
        .filter(|e| match (e.event_id(), cursor.last_event_id) {
            (Some(id), Some(last)) => id > last,
            (Some(_), None) => true,
            // No id on the event: fall back to the timestamp watermark.
            (None, _) => match cursor.last_seen_ms {
                Some(seen) => e.occurred_ms() > seen,
                None => true,
            },
        })
        .collect();

    fresh.sort_by_key(|e| (e.event_id().unwrap_or(i64::MIN), e.occurred_ms()));
    fresh
}

/// The cursor position after processing `events`, never regressing.
pub fn advanced_position<E: FeedEvent>(cursor: &EventCursor, events: &[E]) -> (i64, i64) {
    let newest_id = events
        .iter()
        .filter_map(FeedEvent::event_id)
        .max()
        .unwrap_or(0);
    let newest_ms = events.iter().map(FeedEvent::occurred_ms).max().unwrap_or(0);

    (
        newest_id.max(cursor.last_event_id.unwrap_or(0)),
        newest_ms.max(cursor.last_seen_ms.unwrap_or(0)),
    )
}
