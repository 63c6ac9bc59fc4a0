use anyhow::Result;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tracing::instrument;

use crate::guild::model::GuildConfig;
use crate::guild::repository::GuildConfigRepository;

pub struct SqlxGuildConfigRepository {
    pool: AnyPool,
}

impl SqlxGuildConfigRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuildConfigRepository for SqlxGuildConfigRepository {
    async fn get_or_default(&self, guild_id: &str) -> Result<GuildConfig> {
        let row = sqlx::query(
            r#"
SELECT guild_id, near_range_percent, deposit_floor_abs_usd, deposit_floor_rel_percent,
       poll_interval_ms, dm_on_subscribe, in_range_only, alert_channel_id
FROM guild_settings
WHERE guild_id = ?;
"#,
        )
        .bind(guild_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(GuildConfig {
                guild_id: r.try_get::<String, _>("guild_id")?,
                near_range_percent: r.try_get::<f64, _>("near_range_percent")?,
                deposit_floor_abs_usd: r.try_get::<f64, _>("deposit_floor_abs_usd")?,
                deposit_floor_rel_percent: r.try_get::<f64, _>("deposit_floor_rel_percent")?,
                poll_interval_ms: r.try_get::<i64, _>("poll_interval_ms")?,
                dm_on_subscribe: r.try_get::<i64, _>("dm_on_subscribe")? == 1,
                in_range_only: r.try_get::<i64, _>("in_range_only")? == 1,
                alert_channel_id: r.try_get::<Option<String>, _>("alert_channel_id")?,
            }),
            None => Ok(GuildConfig::default_for(guild_id)),
        }
    }

    #[instrument(skip(self, config), target = "guild", fields(guild_id = %config.guild_id))]
    async fn upsert(&self, config: &GuildConfig) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO guild_settings (guild_id, near_range_percent, deposit_floor_abs_usd,
                            deposit_floor_rel_percent, poll_interval_ms, dm_on_subscribe,
                            in_range_only, alert_channel_id)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(guild_id) DO UPDATE SET
  near_range_percent = excluded.near_range_percent,
  deposit_floor_abs_usd = excluded.deposit_floor_abs_usd,
  deposit_floor_rel_percent = excluded.deposit_floor_rel_percent,
  poll_interval_ms = excluded.poll_interval_ms,
  dm_on_subscribe = excluded.dm_on_subscribe,
  in_range_only = excluded.in_range_only,
  alert_channel_id = excluded.alert_channel_id;
"#,
        )
        .bind(&config.guild_id)
        .bind(config.near_range_percent)
        .bind(config.deposit_floor_abs_usd)
        .bind(config.deposit_floor_rel_percent)
        .bind(config.poll_interval_ms)
        .bind(config.dm_on_subscribe as i64)
        .bind(config.in_range_only as i64)
        .bind(&config.alert_channel_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
