use serde::Deserialize;

use crate::cursor::FeedEvent;
use crate::notional::{ResourceBundle, ResourceKind};

#[derive(Debug, Deserialize)]
pub struct NationsEnvelope {
    pub nations: Vec<NationSnapshot>,
}

/// One nation as the pollers see it. Fetched on demand; only the radar's
/// short-TTL cache holds these across reads within a cycle.
#[derive(Clone, Debug, Deserialize)]
pub struct NationSnapshot {
    pub id: i64,
    pub name: String,
    /// Power rating; `None` when the upstream omits it.
    pub score: Option<f64>,
    #[serde(default)]
    pub beige_turns: i64,
    #[serde(default)]
    pub offensive_wars: i64,
    #[serde(default)]
    pub defensive_wars: i64,
}

#[derive(Debug, Deserialize)]
pub struct BankRecordsEnvelope {
    pub bankrecs: Vec<BankRecord>,
}

/// One bank transfer from the upstream feed (newest-first).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BankRecord {
    pub id: i64,
    /// Transfer timestamp, epoch milliseconds.
    pub date_ms: i64,
    pub sender_id: i64,
    pub receiver_id: i64,

    #[serde(default)]
    pub money: f64,
    #[serde(default)]
    pub food: f64,
    #[serde(default)]
    pub munitions: f64,
    #[serde(default)]
    pub steel: f64,
    #[serde(default)]
    pub oil: f64,
    #[serde(default)]
    pub aluminum: f64,
    #[serde(default)]
    pub uranium: f64,
    #[serde(default)]
    pub gasoline: f64,
    #[serde(default)]
    pub coal: f64,
    #[serde(default)]
    pub iron: f64,
    #[serde(default)]
    pub bauxite: f64,
    #[serde(default)]
    pub lead: f64,
}

impl BankRecord {
    pub fn bundle(&self) -> ResourceBundle {
        ResourceBundle::with_cash(self.money)
            .set(ResourceKind::Food, self.food)
            .set(ResourceKind::Munitions, self.munitions)
            .set(ResourceKind::Steel, self.steel)
            .set(ResourceKind::Oil, self.oil)
            .set(ResourceKind::Aluminum, self.aluminum)
            .set(ResourceKind::Uranium, self.uranium)
            .set(ResourceKind::Gasoline, self.gasoline)
            .set(ResourceKind::Coal, self.coal)
            .set(ResourceKind::Iron, self.iron)
            .set(ResourceKind::Bauxite, self.bauxite)
            .set(ResourceKind::Lead, self.lead)
    }
}

impl FeedEvent for BankRecord {
    fn event_id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn occurred_ms(&self) -> i64 {
        self.date_ms
    }
}
