//! Deposit polling orchestrator.
//!
//! Responsibilities:
//! - Pull new bank records past the cursor each tick, ascending.
//! - Value each record against the cycle's price map.
//! - Decide channel post vs per-watcher DM vs suppress, consulting the
//!   ledger (dedup) and the watch registry (fan-out).
//! - Advance the cursor last, and only when the fetch itself succeeded.
//!
//! Non-responsibilities:
//! - Rendering beyond plain text (out of scope at the delivery boundary).
//! - Retrying failed deliveries: a failed post still counts as fired so a
//!   revoked channel or closed DM cannot cause a retry storm.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument, warn};

use crate::api::GameApi;
use crate::api::types::BankRecord;
use crate::cursor::repository::CursorRepository;
use crate::cursor::{advanced_position, filter_ascending};
use crate::delivery::DeliveryAdapter;
use crate::deposit::BANK_STREAM;
use crate::deposit::decision::{
    channel_gate_passes, passes_floor, watcher_floor, watcher_range_ok,
};
use crate::guild::model::GuildConfig;
use crate::guild::repository::GuildConfigRepository;
use crate::ledger::model::{AlertKind, LedgerEntry, deposit_dm_fingerprint, deposit_fingerprint};
use crate::ledger::repository::LedgerRepository;
use crate::link::repository::LinkRepository;
use crate::logger::warn_if_slow;
use crate::metrics::Counters;
use crate::notional::{PriceMap, notional_usd, round_usd};
use crate::time::now_ms;
use crate::watch::repository::WatchRepository;

pub struct DepositPoller {
    guild_id: String,
    page_limit: usize,

    api: Arc<dyn GameApi>,
    delivery: Arc<dyn DeliveryAdapter>,
    cursors: Arc<dyn CursorRepository>,
    ledger: Arc<dyn LedgerRepository>,
    watches: Arc<dyn WatchRepository>,
    guilds: Arc<dyn GuildConfigRepository>,
    links: Arc<dyn LinkRepository>,

    counters: Counters,
}

impl DepositPoller {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        guild_id: String,
        page_limit: usize,
        api: Arc<dyn GameApi>,
        delivery: Arc<dyn DeliveryAdapter>,
        cursors: Arc<dyn CursorRepository>,
        ledger: Arc<dyn LedgerRepository>,
        watches: Arc<dyn WatchRepository>,
        guilds: Arc<dyn GuildConfigRepository>,
        links: Arc<dyn LinkRepository>,
        counters: Counters,
    ) -> Self {
        Self {
            guild_id,
            page_limit,
            api,
            delivery,
            cursors,
            ledger,
            watches,
            guilds,
            links,
            counters,
        }
    }

    /// Fixed-cadence loop. `MissedTickBehavior::Skip` is the in-flight
    /// guard: a tick that fires while a cycle is still running is dropped,
    /// never queued.
    pub async fn run(self: Arc<Self>, every: Duration) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(every_ms = every.as_millis() as u64, "deposit poller started");

        loop {
            ticker.tick().await;
            if let Err(e) = self.cycle(now_ms()).await {
                error!(error = ?e, "deposit cycle failed");
            }
        }
    }

    /// One polling cycle. Upstream failures degrade to "no new data":
    /// the cycle ends early and the cursor stays where it was.
    #[instrument(skip(self), target = "deposit", fields(guild_id = %self.guild_id))]
    pub async fn cycle(&self, now_ms: i64) -> anyhow::Result<()> {
        self.counters.deposit_cycles.fetch_add(1, Ordering::Relaxed);

        let cfg = self.guilds.get_or_default(&self.guild_id).await?;

        // One price fetch per cycle, not per event.
        let prices = match self.api.fetch_price_map().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = ?e, "price fetch failed; skipping cycle");
                return Ok(());
            }
        };

        let page = match self.api.fetch_recent_bank_records(self.page_limit).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = ?e, "bank feed fetch failed; skipping cycle");
                return Ok(());
            }
        };

        let cursor = self.cursors.get(BANK_STREAM).await?;
        let fresh = filter_ascending(page, &cursor);
        if fresh.is_empty() {
            debug!("no unseen bank records this cycle");
            return Ok(());
        }

        info!(count = fresh.len(), "processing fresh bank records");

        for rec in &fresh {
            // A failed event still counts toward cursor advancement; the
            // ledger's fingerprint dedup makes any re-processing harmless.
            if let Err(e) = self.process_event(rec, &cfg, &prices, now_ms).await {
                warn!(error = ?e, event_id = rec.id, "bank record processing failed");
            }
        }

        let (last_id, last_seen) = advanced_position(&cursor, &fresh);
        warn_if_slow("cursor_advance", Duration::from_millis(50), async {
            self.cursors.advance(BANK_STREAM, last_id, last_seen).await
        })
        .await?;

        Ok(())
    }

    async fn process_event(
        &self,
        rec: &BankRecord,
        cfg: &GuildConfig,
        prices: &PriceMap,
        now_ms: i64,
    ) -> anyhow::Result<()> {
        let notional = notional_usd(&rec.bundle(), prices);
        if !passes_floor(notional, cfg.deposit_floor_abs_usd) {
            self.counters
                .deposit_skip_floor
                .fetch_add(1, Ordering::Relaxed);
            debug!(event_id = rec.id, notional, "below guild floor; skipped");
            return Ok(());
        }

        let usd = round_usd(notional);
        let fingerprint = deposit_fingerprint(rec.id, rec.receiver_id, usd);
        if self.ledger.has_fired(&fingerprint).await? {
            self.counters
                .deposit_skip_dup
                .fetch_add(1, Ordering::Relaxed);
            debug!(event_id = rec.id, "already fired; skipped");
            return Ok(());
        }

        let watchers = self.watches.watchers_of(rec.receiver_id).await?;
        let scores = self.gather_scores(rec, cfg, &watchers).await?;
        let receiver_score = scores.get(&rec.receiver_id).copied().flatten();

        // Channel post, subject to the (default-off) guild in-range gate.
        if let Some(channel_id) = &cfg.alert_channel_id {
            let primary_scores = self.guild_primary_scores(cfg, &scores).await?;
            if channel_gate_passes(
                cfg.in_range_only,
                &primary_scores,
                receiver_score,
                cfg.near_range_percent,
            ) {
                let text = format!(
                    "Bank alert: ${usd} deposited to nation {} (event {})",
                    rec.receiver_id, rec.id
                );
                if let Err(e) = self.delivery.post_to_channel(channel_id, &text).await {
                    warn!(error = ?e, channel_id = %channel_id, "channel post failed; counted as fired");
                }
                self.counters.deposit_posts.fetch_add(1, Ordering::Relaxed);
            } else {
                self.counters
                    .deposit_skip_gate
                    .fetch_add(1, Ordering::Relaxed);
            }
        }

        // Per-watcher DM fan-out, each independently deduplicated.
        for watch in &watchers {
            if !passes_floor(notional, watcher_floor(watch, cfg.deposit_floor_abs_usd)) {
                continue;
            }

            let watcher_score = if watch.in_range_only {
                match self.links.primary_link(&watch.user_id).await? {
                    Some(link) => scores.get(&link.nation_id).copied().flatten(),
                    None => None,
                }
            } else {
                None
            };
            if !watcher_range_ok(watch, watcher_score, receiver_score, cfg.near_range_percent) {
                continue;
            }

            let dm_fingerprint =
                deposit_dm_fingerprint(rec.id, rec.receiver_id, usd, &watch.user_id);
            if self.ledger.has_fired(&dm_fingerprint).await? {
                continue;
            }

            let text = format!(
                "Watched nation {} received a ${usd} deposit (event {})",
                rec.receiver_id, rec.id
            );
            if let Err(e) = self
                .delivery
                .send_direct_message(&watch.user_id, &text)
                .await
            {
                warn!(error = ?e, user_id = %watch.user_id, "watcher DM failed; counted as fired");
            }

            self.ledger
                .record(LedgerEntry {
                    kind: AlertKind::DepositWatchDm,
                    subject_id: rec.receiver_id,
                    value: usd,
                    fingerprint: dm_fingerprint,
                    created_ms: now_ms,
                })
                .await?;
            self.counters.deposit_dms.fetch_add(1, Ordering::Relaxed);
        }

        // Channel-post ledger entry is written regardless of DM outcomes.
        self.ledger
            .record(LedgerEntry {
                kind: AlertKind::Deposit,
                subject_id: rec.receiver_id,
                value: usd,
                fingerprint,
                created_ms: now_ms,
            })
            .await?;

        Ok(())
    }

    /// Fetches the scores an event's gates will need, in one upstream call.
    /// A failed fetch degrades to an empty map, which fails every gate
    /// closed for this event only.
    async fn gather_scores(
        &self,
        rec: &BankRecord,
        cfg: &GuildConfig,
        watchers: &[crate::watch::model::Watch],
    ) -> anyhow::Result<HashMap<i64, Option<f64>>> {
        let mut wanted: HashSet<i64> = HashSet::new();

        if cfg.in_range_only || watchers.iter().any(|w| w.in_range_only) {
            wanted.insert(rec.receiver_id);
        }
        if cfg.in_range_only {
            for link in self.links.primary_links(&cfg.guild_id).await? {
                wanted.insert(link.nation_id);
            }
        }
        for watch in watchers.iter().filter(|w| w.in_range_only) {
            if let Some(link) = self.links.primary_link(&watch.user_id).await? {
                wanted.insert(link.nation_id);
            }
        }

        if wanted.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i64> = wanted.into_iter().collect();
        match self.api.fetch_nations(&ids).await {
            Ok(snapshots) => Ok(snapshots
                .into_iter()
                .map(|(id, n)| (id, n.score))
                .collect()),
            Err(e) => {
                warn!(error = ?e, "score fetch failed; range gates fail closed for this event");
                Ok(HashMap::new())
            }
        }
    }

    async fn guild_primary_scores(
        &self,
        cfg: &GuildConfig,
        scores: &HashMap<i64, Option<f64>>,
    ) -> anyhow::Result<Vec<f64>> {
        if !cfg.in_range_only {
            return Ok(Vec::new());
        }
        let links = self.links.primary_links(&cfg.guild_id).await?;
        Ok(links
            .iter()
            .filter_map(|l| scores.get(&l.nation_id).copied().flatten())
            .collect())
    }
}
