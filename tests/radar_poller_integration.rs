use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};

use pnw_sentinel::api::GameApi;
use pnw_sentinel::api::errors::ApiError;
use pnw_sentinel::api::types::{BankRecord, NationSnapshot};
use pnw_sentinel::db::schema;
use pnw_sentinel::delivery::{DeliveryAdapter, DeliveryError};
use pnw_sentinel::guild::model::GuildConfig;
use pnw_sentinel::guild::repository::GuildConfigRepository;
use pnw_sentinel::guild::repository_sqlx::SqlxGuildConfigRepository;
use pnw_sentinel::ledger::repository_sqlx::SqlxLedgerRepository;
use pnw_sentinel::metrics::Counters;
use pnw_sentinel::notional::PriceMap;
use pnw_sentinel::radar::RADAR_COOLDOWN_MS;
use pnw_sentinel::radar::poller::RadarPoller;
use pnw_sentinel::watch::model::WatchPatch;
use pnw_sentinel::watch::repository::WatchRepository;
use pnw_sentinel::watch::repository_sqlx::SqlxWatchRepository;

struct MockApi {
    nations: Mutex<HashMap<i64, NationSnapshot>>,
}

impl MockApi {
    fn with_nations(nations: Vec<NationSnapshot>) -> Arc<Self> {
        Arc::new(Self {
            nations: Mutex::new(nations.into_iter().map(|n| (n.id, n)).collect()),
        })
    }

    fn set_beige_turns(&self, id: i64, turns: i64) {
        if let Some(n) = self.nations.lock().get_mut(&id) {
            n.beige_turns = turns;
        }
    }
}

#[async_trait]
impl GameApi for MockApi {
    async fn fetch_nations(&self, ids: &[i64]) -> Result<HashMap<i64, NationSnapshot>, ApiError> {
        let nations = self.nations.lock();
        Ok(ids
            .iter()
            .filter_map(|id| nations.get(id).cloned().map(|n| (*id, n)))
            .collect())
    }

    async fn fetch_recent_bank_records(&self, _limit: usize) -> Result<Vec<BankRecord>, ApiError> {
        Ok(Vec::new())
    }

    async fn fetch_price_map(&self) -> Result<PriceMap, ApiError> {
        Ok(PriceMap::new())
    }
}

#[derive(Default)]
struct RecordingDelivery {
    posts: Mutex<Vec<(String, String)>>,
    dms: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl DeliveryAdapter for RecordingDelivery {
    async fn post_to_channel(&self, channel_id: &str, text: &str) -> Result<(), DeliveryError> {
        self.posts
            .lock()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, text: &str) -> Result<(), DeliveryError> {
        self.dms
            .lock()
            .push((user_id.to_string(), text.to_string()));
        Ok(())
    }
}

async fn setup_db() -> AnyPool {
    sqlx::any::install_default_drivers();

    let db_name: u64 = rand::random();
    let conn_str = format!("sqlite:file:radar{}?mode=memory&cache=shared", db_name);

    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .connect(&conn_str)
        .await
        .unwrap();

    schema::migrate(&pool).await.unwrap();
    pool
}

fn nation(id: i64, beige_turns: i64, offensive_wars: i64, defensive_wars: i64) -> NationSnapshot {
    NationSnapshot {
        id,
        name: format!("Nation {id}"),
        score: Some(1_000.0),
        beige_turns,
        offensive_wars,
        defensive_wars,
    }
}

struct Harness {
    pool: AnyPool,
    poller: RadarPoller,
    delivery: Arc<RecordingDelivery>,
    watches: Arc<SqlxWatchRepository>,
}

async fn harness(api: Arc<MockApi>) -> Harness {
    let pool = setup_db().await;
    let delivery = Arc::new(RecordingDelivery::default());
    let watches = Arc::new(SqlxWatchRepository::new(pool.clone()));
    let guilds = Arc::new(SqlxGuildConfigRepository::new(pool.clone()));

    let mut cfg = GuildConfig::default_for("g1");
    cfg.alert_channel_id = Some("radar-chan".to_string());
    guilds.upsert(&cfg).await.unwrap();

    let poller = RadarPoller::new(
        "g1".to_string(),
        // zero TTL: every cycle refetches, so tests see state changes
        0,
        api,
        delivery.clone(),
        Arc::new(SqlxLedgerRepository::new(pool.clone())),
        watches.clone(),
        guilds,
        Counters::default(),
    );

    Harness {
        pool,
        poller,
        delivery,
        watches,
    }
}

async fn ledger_count(pool: &AnyPool, kind: &str) -> i64 {
    sqlx::query(r#"SELECT COUNT(*) AS n FROM alert_ledger WHERE kind = ?;"#)
        .bind(kind)
        .fetch_one(pool)
        .await
        .unwrap()
        .get::<i64, _>("n")
}

#[tokio::test]
async fn slot_open_alert_respects_cooldown_then_refires() {
    // One offensive war: two offensive slots open.
    let h = harness(MockApi::with_nations(vec![nation(9, 0, 1, 3)])).await;
    h.watches
        .upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();

    let t0 = 1_000_000;
    h.poller.cycle(t0).await.unwrap();
    h.poller.cycle(t0 + 10 * 60 * 1_000).await.unwrap();

    // Two conditions inside one window: exactly one alert.
    assert_eq!(h.delivery.posts.lock().len(), 1);
    assert_eq!(ledger_count(&h.pool, "slot_open").await, 1);

    // Past the window: a second alert.
    h.poller.cycle(t0 + RADAR_COOLDOWN_MS + 1_000).await.unwrap();
    assert_eq!(h.delivery.posts.lock().len(), 2);
    assert_eq!(ledger_count(&h.pool, "slot_open").await, 2);
}

#[tokio::test]
async fn full_slots_raise_nothing() {
    let h = harness(MockApi::with_nations(vec![nation(9, 0, 3, 3)])).await;
    h.watches
        .upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();

    h.poller.cycle(1_000_000).await.unwrap();

    assert!(h.delivery.posts.lock().is_empty());
    assert_eq!(ledger_count(&h.pool, "slot_open").await, 0);
}

#[tokio::test]
async fn beige_dm_fires_once_per_turn_bucket() {
    // One beige turn left = 120 minutes; watcher leads by 240.
    let h = harness(MockApi::with_nations(vec![nation(9, 1, 3, 3)])).await;
    h.watches
        .upsert_watch(
            "u1",
            9,
            WatchPatch {
                beige_lead_minutes: Some(240),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let t0 = 1_000_000;
    h.poller.cycle(t0).await.unwrap();
    // Same state next cycle: the watcher is not re-DM'd.
    h.poller.cycle(t0 + 90_000).await.unwrap();

    let dms = h.delivery.dms.lock().clone();
    assert_eq!(dms.len(), 1);
    assert_eq!(dms[0].0, "u1");

    // Channel alert fired exactly once inside the window.
    assert_eq!(h.delivery.posts.lock().len(), 1);
}

#[tokio::test]
async fn beige_channel_refires_after_cooldown_without_new_dm() {
    let h = harness(MockApi::with_nations(vec![nation(9, 1, 3, 3)])).await;
    h.watches
        .upsert_watch(
            "u1",
            9,
            WatchPatch {
                beige_lead_minutes: Some(240),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let t0 = 1_000_000;
    h.poller.cycle(t0).await.unwrap();
    h.poller.cycle(t0 + RADAR_COOLDOWN_MS + 1_000).await.unwrap();

    // Turn bucket unchanged: one DM total, but the channel re-alerted.
    assert_eq!(h.delivery.dms.lock().len(), 1);
    assert_eq!(h.delivery.posts.lock().len(), 2);
}

#[tokio::test]
async fn short_lead_watcher_does_not_qualify() {
    // Default lead is 60 minutes; two turns = 240 minutes out.
    let h = harness(MockApi::with_nations(vec![nation(9, 2, 3, 3)])).await;
    h.watches
        .upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();

    h.poller.cycle(1_000_000).await.unwrap();

    assert!(h.delivery.dms.lock().is_empty());
    assert!(h.delivery.posts.lock().is_empty());
    assert_eq!(ledger_count(&h.pool, "beige_soon").await, 0);
}

#[tokio::test]
async fn missing_snapshot_skips_subject_without_error() {
    // Watched subject the API does not know.
    let h = harness(MockApi::with_nations(vec![])).await;
    h.watches
        .upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();

    h.poller.cycle(1_000_000).await.unwrap();

    assert!(h.delivery.posts.lock().is_empty());
    assert!(h.delivery.dms.lock().is_empty());
}

#[tokio::test]
async fn decayed_turn_bucket_re_alerts_watcher() {
    let api = MockApi::with_nations(vec![nation(9, 2, 3, 3)]);
    let h = harness(api.clone()).await;
    h.watches
        .upsert_watch(
            "u1",
            9,
            WatchPatch {
                beige_lead_minutes: Some(480),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let t0 = 1_000_000;
    h.poller.cycle(t0).await.unwrap();
    assert_eq!(h.delivery.dms.lock().len(), 1);

    // Beige decays a turn; the fingerprint bucket changes and the watcher
    // hears about the new state.
    api.set_beige_turns(9, 1);
    h.poller.cycle(t0 + RADAR_COOLDOWN_MS + 1_000).await.unwrap();
    assert_eq!(h.delivery.dms.lock().len(), 2);
    assert_eq!(h.delivery.posts.lock().len(), 2);
}
