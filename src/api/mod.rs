pub mod client;
pub mod errors;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::api::errors::ApiError;
use crate::api::types::{BankRecord, NationSnapshot};
use crate::notional::PriceMap;

/// Upstream game API at the granularity the pollers need.
///
/// Implementations must be best-effort: a network failure surfaces as an
/// `Err` here and the caller degrades it to "no new data this cycle".
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Snapshots for the given nation ids. Ids the upstream does not know
    /// are simply absent from the result.
    async fn fetch_nations(&self, ids: &[i64]) -> Result<HashMap<i64, NationSnapshot>, ApiError>;

    /// Most recent bank records, newest-first, bounded by `limit`. The
    /// upstream only exposes a fixed recent window.
    async fn fetch_recent_bank_records(&self, limit: usize) -> Result<Vec<BankRecord>, ApiError>;

    /// Current market prices per resource kind.
    async fn fetch_price_map(&self) -> Result<PriceMap, ApiError>;
}
