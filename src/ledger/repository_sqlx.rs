use anyhow::Result;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tracing::instrument;

use crate::ledger::model::{AlertKind, LedgerEntry};
use crate::ledger::repository::LedgerRepository;

/// SQLx-backed alert ledger. Responsible only for persistence; fingerprint
/// construction lives with the model.
pub struct SqlxLedgerRepository {
    pool: AnyPool,
}

impl SqlxLedgerRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for SqlxLedgerRepository {
    #[instrument(skip(self), target = "ledger", level = "debug")]
    async fn has_fired(&self, fingerprint: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"SELECT COUNT(*) AS n FROM alert_ledger WHERE fingerprint = ?;"#,
        )
        .bind(fingerprint)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get::<i64, _>("n")? > 0)
    }

    #[instrument(skip(self), target = "ledger", level = "debug")]
    async fn fired_within(
        &self,
        kind: AlertKind,
        subject_id: i64,
        window_ms: i64,
        now_ms: i64,
    ) -> Result<bool> {
        let cutoff = now_ms - window_ms;

        let row = sqlx::query(
            r#"
SELECT COUNT(*) AS n FROM alert_ledger
WHERE kind = ? AND subject_id = ? AND created_ms > ?;
"#,
        )
        .bind(kind.as_str())
        .bind(subject_id)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get::<i64, _>("n")? > 0)
    }

    #[instrument(
        skip(self, entry),
        target = "ledger",
        fields(kind = entry.kind.as_str(), subject_id = entry.subject_id),
        level = "debug"
    )]
    async fn record(&self, entry: LedgerEntry) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO alert_ledger (kind, subject_id, value, fingerprint, created_ms)
VALUES (?, ?, ?, ?, ?);
"#,
        )
        .bind(entry.kind.as_str())
        .bind(entry.subject_id)
        .bind(entry.value)
        .bind(&entry.fingerprint)
        .bind(entry.created_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
