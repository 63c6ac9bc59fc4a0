use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::api::GameApi;
use crate::api::errors::ApiError;
use crate::api::types::{BankRecord, BankRecordsEnvelope, NationSnapshot, NationsEnvelope};
use crate::notional::{PriceMap, ResourceKind};

/// HTTP client for the game API.
///
/// Every call carries a bounded timeout; a hung upstream must not be able
/// to starve the pollers' subsequent ticks.
#[derive(Clone)]
pub struct PnwClient {
    http: Client,
    base: String,
    api_key: String,
}

impl PnwClient {
    pub fn new(base: String, api_key: String, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl GameApi for PnwClient {
    #[instrument(skip(self), fields(count = ids.len()), level = "debug")]
    async fn fetch_nations(&self, ids: &[i64]) -> Result<HashMap<i64, NationSnapshot>, ApiError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let id_list = ids
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/nations?ids={}&key={}", self.base, id_list, self.api_key);

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let envelope: NationsEnvelope = resp.json().await?;

        debug!(returned = envelope.nations.len(), "nations fetched");

        Ok(envelope.nations.into_iter().map(|n| (n.id, n)).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_recent_bank_records(&self, limit: usize) -> Result<Vec<BankRecord>, ApiError> {
        let url = format!("{}/bankrecs?limit={}&key={}", self.base, limit, self.api_key);

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let envelope: BankRecordsEnvelope = resp.json().await?;

        debug!(returned = envelope.bankrecs.len(), "bank records fetched");

        Ok(envelope.bankrecs)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_price_map(&self) -> Result<PriceMap, ApiError> {
        let url = format!("{}/tradeprices?key={}", self.base, self.api_key);

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let raw: HashMap<String, f64> = resp.json().await?;

        // Unknown resource names are dropped; a missing price values as 0
        // downstream, which is the documented degrade path.
        let prices = raw
            .into_iter()
            .filter_map(|(name, price)| ResourceKind::from_str(&name).map(|k| (k, price)))
            .collect();

        Ok(prices)
    }
}
