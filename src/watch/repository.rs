use anyhow::Result;
use async_trait::async_trait;

use crate::watch::model::{Watch, WatchPatch};

#[async_trait]
pub trait WatchRepository: Send + Sync {
    /// Merge-upsert: creates the watch with defaults on first sight, then
    /// applies the patch. Returns the stored result.
    async fn upsert_watch(&self, user_id: &str, subject_id: i64, patch: WatchPatch)
    -> Result<Watch>;

    async fn remove_watch(&self, user_id: &str, subject_id: i64) -> Result<bool>;

    async fn list_watches(&self, user_id: &str) -> Result<Vec<Watch>>;

    /// DM-enabled watches on a subject. Floor and range gating are left to
    /// the caller; they need runtime context this registry does not have.
    async fn watchers_of(&self, subject_id: i64) -> Result<Vec<Watch>>;

    /// Distinct subject ids with at least one watch, for the radar sweep.
    async fn watched_subjects(&self) -> Result<Vec<i64>>;
}
