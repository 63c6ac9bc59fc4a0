use anyhow::Result;
use async_trait::async_trait;

use crate::guild::model::GuildConfig;

#[async_trait]
pub trait GuildConfigRepository: Send + Sync {
    /// Stored config, or defaults when no row exists yet.
    async fn get_or_default(&self, guild_id: &str) -> Result<GuildConfig>;

    /// Writes the full config row (first settings change creates it).
    async fn upsert(&self, config: &GuildConfig) -> Result<()>;
}
