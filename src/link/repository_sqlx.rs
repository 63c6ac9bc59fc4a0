use anyhow::Result;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tracing::instrument;

use crate::link::model::NationLink;
use crate::link::repository::LinkRepository;

pub struct SqlxLinkRepository {
    pool: AnyPool,
}

impl SqlxLinkRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for SqlxLinkRepository {
    #[instrument(skip(self), target = "link")]
    async fn set_primary(
        &self,
        user_id: &str,
        nation_id: i64,
        guild_id: &str,
        now_ms: i64,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"UPDATE nation_links SET is_primary = 0 WHERE user_id = ?;"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
INSERT INTO nation_links (user_id, nation_id, guild_id, is_primary, linked_ms)
VALUES (?, ?, ?, 1, ?)
ON CONFLICT(user_id, nation_id) DO UPDATE SET
  is_primary = 1,
  guild_id = excluded.guild_id,
  linked_ms = excluded.linked_ms;
"#,
        )
        .bind(user_id)
        .bind(nation_id)
        .bind(guild_id)
        .bind(now_ms)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn primary_link(&self, user_id: &str) -> Result<Option<NationLink>> {
        let row = sqlx::query(
            r#"
SELECT user_id, nation_id, guild_id, is_primary, linked_ms
FROM nation_links
WHERE user_id = ? AND is_primary = 1;
"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_link(&r)?)),
            None => Ok(None),
        }
    }

    async fn primary_links(&self, guild_id: &str) -> Result<Vec<NationLink>> {
        let rows = sqlx::query(
            r#"
SELECT user_id, nation_id, guild_id, is_primary, linked_ms
FROM nation_links
WHERE guild_id = ? AND is_primary = 1
ORDER BY user_id;
"#,
        )
        .bind(guild_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(row_to_link(&r)?);
        }
        Ok(out)
    }
}

fn row_to_link(r: &sqlx::any::AnyRow) -> Result<NationLink> {
    Ok(NationLink {
        user_id: r.try_get::<String, _>("user_id")?,
        nation_id: r.try_get::<i64, _>("nation_id")?,
        guild_id: r.try_get::<String, _>("guild_id")?,
        is_primary: r.try_get::<i64, _>("is_primary")? == 1,
        linked_ms: r.try_get::<i64, _>("linked_ms")?,
    })
}
