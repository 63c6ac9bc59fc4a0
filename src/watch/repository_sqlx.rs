use anyhow::Result;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tracing::{instrument, warn};

use crate::watch::model::{Watch, WatchPatch};
use crate::watch::repository::WatchRepository;

/// SQLx-backed watch registry. Responsible only for persistence and row
/// mapping; merge semantics live on the model.
pub struct SqlxWatchRepository {
    pool: AnyPool,
}

impl SqlxWatchRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, user_id: &str, subject_id: i64) -> Result<Option<Watch>> {
        let row = sqlx::query(
            r#"
SELECT user_id, subject_id, dm_enabled, bank_abs_usd_floor, beige_lead_minutes, in_range_only
FROM watches
WHERE user_id = ? AND subject_id = ?;
"#,
        )
        .bind(user_id)
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_watch(&r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl WatchRepository for SqlxWatchRepository {
    #[instrument(skip(self, patch), target = "watch", fields(user_id, subject_id))]
    async fn upsert_watch(
        &self,
        user_id: &str,
        subject_id: i64,
        patch: WatchPatch,
    ) -> Result<Watch> {
        let mut watch = self
            .fetch(user_id, subject_id)
            .await?
            .unwrap_or_else(|| Watch::new(user_id, subject_id));
        watch.apply(&patch);

        sqlx::query(
            r#"
INSERT INTO watches (user_id, subject_id, dm_enabled, bank_abs_usd_floor, beige_lead_minutes, in_range_only)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT(user_id, subject_id) DO UPDATE SET
  dm_enabled = excluded.dm_enabled,
  bank_abs_usd_floor = excluded.bank_abs_usd_floor,
  beige_lead_minutes = excluded.beige_lead_minutes,
  in_range_only = excluded.in_range_only;
"#,
        )
        .bind(&watch.user_id)
        .bind(watch.subject_id)
        .bind(watch.dm_enabled as i64)
        .bind(watch.bank_abs_usd_floor)
        .bind(watch.beige_lead_minutes)
        .bind(watch.in_range_only as i64)
        .execute(&self.pool)
        .await?;

        Ok(watch)
    }

    #[instrument(skip(self), target = "watch")]
    async fn remove_watch(&self, user_id: &str, subject_id: i64) -> Result<bool> {
        let res = sqlx::query(r#"DELETE FROM watches WHERE user_id = ? AND subject_id = ?;"#)
            .bind(user_id)
            .bind(subject_id)
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }

    async fn list_watches(&self, user_id: &str) -> Result<Vec<Watch>> {
        let rows = sqlx::query(
            r#"
SELECT user_id, subject_id, dm_enabled, bank_abs_usd_floor, beige_lead_minutes, in_range_only
FROM watches
WHERE user_id = ?
ORDER BY subject_id;
"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        collect_watches(rows)
    }

    async fn watchers_of(&self, subject_id: i64) -> Result<Vec<Watch>> {
        let rows = sqlx::query(
            r#"
SELECT user_id, subject_id, dm_enabled, bank_abs_usd_floor, beige_lead_minutes, in_range_only
FROM watches
WHERE subject_id = ? AND dm_enabled = 1
ORDER BY user_id;
"#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        collect_watches(rows)
    }

    async fn watched_subjects(&self) -> Result<Vec<i64>> {
        let rows =
            sqlx::query(r#"SELECT DISTINCT subject_id FROM watches ORDER BY subject_id;"#)
                .fetch_all(&self.pool)
                .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(r.try_get::<i64, _>("subject_id")?);
        }
        Ok(out)
    }
}

fn collect_watches(rows: Vec<sqlx::any::AnyRow>) -> Result<Vec<Watch>> {
    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        match row_to_watch(&r) {
            Ok(w) => out.push(w),
            Err(e) => {
                // poison-row resilience: skip but don't fail the batch
                warn!(error = %e, "skipping malformed watch row");
            }
        }
    }
    Ok(out)
}

fn row_to_watch(r: &sqlx::any::AnyRow) -> Result<Watch> {
    Ok(Watch {
        user_id: r.try_get::<String, _>("user_id")?,
        subject_id: r.try_get::<i64, _>("subject_id")?,
        dm_enabled: r.try_get::<i64, _>("dm_enabled")? == 1,
        bank_abs_usd_floor: r.try_get::<Option<f64>, _>("bank_abs_usd_floor")?,
        beige_lead_minutes: r.try_get::<Option<i64>, _>("beige_lead_minutes")?,
        in_range_only: r.try_get::<i64, _>("in_range_only")? == 1,
    })
}
