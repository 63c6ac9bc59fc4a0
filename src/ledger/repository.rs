use anyhow::Result;
use async_trait::async_trait;

use crate::ledger::model::{AlertKind, LedgerEntry};

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Exact-fingerprint dedup (deposit-style alerts).
    async fn has_fired(&self, fingerprint: &str) -> Result<bool>;

    /// Cooldown dedup (radar-style alerts): has anything of this kind fired
    /// for this subject within the trailing window ending at `now_ms`?
    async fn fired_within(
        &self,
        kind: AlertKind,
        subject_id: i64,
        window_ms: i64,
        now_ms: i64,
    ) -> Result<bool>;

    /// Append-only; never updated, never trimmed here.
    async fn record(&self, entry: LedgerEntry) -> Result<()>;
}
