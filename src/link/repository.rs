use anyhow::Result;
use async_trait::async_trait;

use crate::link::model::NationLink;

#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Demotes any existing primary and promotes (or inserts) the given
    /// nation, transactionally. The one-primary-per-user invariant is also
    /// backed by a unique index, so a racing call fails instead of leaving
    /// two primaries.
    async fn set_primary(
        &self,
        user_id: &str,
        nation_id: i64,
        guild_id: &str,
        now_ms: i64,
    ) -> Result<()>;

    async fn primary_link(&self, user_id: &str) -> Result<Option<NationLink>>;

    /// Primary links across a guild, for the guild-level in-range gate.
    async fn primary_links(&self, guild_id: &str) -> Result<Vec<NationLink>>;
}
