//! War radar polling orchestrator.
//!
//! Sweeps every watched nation each cycle and raises two alert families:
//! slot-open (either war side has spare capacity) and beige-soon (the
//! nation's war immunity is about to lapse). Channel alerts are gated by a
//! 30-minute ledger cooldown; beige DMs are one-shot per (watcher, subject,
//! turn bucket) so a watcher inside their lead window is told once per
//! state change rather than once per cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, info, instrument, warn};

use crate::api::GameApi;
use crate::api::types::NationSnapshot;
use crate::cache::TtlCache;
use crate::delivery::DeliveryAdapter;
use crate::guild::repository::GuildConfigRepository;
use crate::ledger::model::{
    AlertKind, LedgerEntry, beige_dm_fingerprint, beige_fingerprint, slot_open_fingerprint,
};
use crate::ledger::repository::LedgerRepository;
use crate::logger::warn_if_slow;
use crate::metrics::Counters;
use crate::radar::decision::{beige_lead_qualifies, minutes_until_beige_exit, open_slots};
use crate::radar::RADAR_COOLDOWN_MS;
use crate::time::now_ms;
use crate::watch::repository::WatchRepository;

pub struct RadarPoller {
    guild_id: String,

    api: Arc<dyn GameApi>,
    delivery: Arc<dyn DeliveryAdapter>,
    ledger: Arc<dyn LedgerRepository>,
    watches: Arc<dyn WatchRepository>,
    guilds: Arc<dyn GuildConfigRepository>,

    /// Short-TTL snapshot cache owned by this poller instance, never a
    /// process-wide singleton; the clock is injected via `cycle`.
    snapshots: TtlCache<i64, NationSnapshot>,

    counters: Counters,
}

impl RadarPoller {
    pub fn new(
        guild_id: String,
        snapshot_ttl_ms: i64,
        api: Arc<dyn GameApi>,
        delivery: Arc<dyn DeliveryAdapter>,
        ledger: Arc<dyn LedgerRepository>,
        watches: Arc<dyn WatchRepository>,
        guilds: Arc<dyn GuildConfigRepository>,
        counters: Counters,
    ) -> Self {
        Self {
            guild_id,
            api,
            delivery,
            ledger,
            watches,
            guilds,
            snapshots: TtlCache::new(snapshot_ttl_ms),
            counters,
        }
    }

    /// Jittered loop: each sleep is the base interval scaled by a random
    /// factor in [0.7, 1.3] so concurrently started instances drift apart
    /// instead of hammering the upstream in sync.
    pub async fn run(self: Arc<Self>, base: Duration) {
        info!(base_ms = base.as_millis() as u64, "radar poller started");

        loop {
            let factor: f64 = rand::thread_rng().gen_range(0.7..=1.3);
            tokio::time::sleep(base.mul_f64(factor)).await;

            if let Err(e) = self.cycle(now_ms()).await {
                error!(error = ?e, "radar cycle failed");
            }
        }
    }

    #[instrument(skip(self), target = "radar", fields(guild_id = %self.guild_id))]
    pub async fn cycle(&self, now_ms: i64) -> anyhow::Result<()> {
        self.counters.radar_cycles.fetch_add(1, Ordering::Relaxed);
        self.snapshots.purge_expired(now_ms);

        let cfg = self.guilds.get_or_default(&self.guild_id).await?;
        let subjects = self.watches.watched_subjects().await?;
        if subjects.is_empty() {
            debug!("no watched subjects");
            return Ok(());
        }

        let snapshots = self.load_snapshots(&subjects, now_ms).await;

        for subject_id in subjects {
            // API degraded or nation deleted: skip this subject this cycle.
            let Some(snapshot) = snapshots.get(&subject_id) else {
                debug!(subject_id, "no snapshot; skipped");
                continue;
            };

            if let Err(e) = self
                .check_slots(snapshot, cfg.alert_channel_id.as_deref(), now_ms)
                .await
            {
                warn!(error = ?e, subject_id, "slot check failed");
            }
            if let Err(e) = self
                .check_beige(snapshot, cfg.alert_channel_id.as_deref(), now_ms)
                .await
            {
                warn!(error = ?e, subject_id, "beige check failed");
            }
        }

        Ok(())
    }

    /// Serves snapshots from the TTL cache and fetches the misses in one
    /// batch. A failed fetch leaves the misses absent; callers treat
    /// absence as "skip this subject".
    async fn load_snapshots(
        &self,
        subjects: &[i64],
        now_ms: i64,
    ) -> HashMap<i64, NationSnapshot> {
        let mut out = HashMap::new();
        let mut misses = Vec::new();

        for id in subjects {
            match self.snapshots.get(id, now_ms) {
                Some(s) => {
                    out.insert(*id, s);
                }
                None => misses.push(*id),
            }
        }

        if misses.is_empty() {
            return out;
        }

        let fetched = warn_if_slow("radar_fetch_nations", Duration::from_secs(5), async {
            self.api.fetch_nations(&misses).await
        })
        .await;

        match fetched {
            Ok(snapshots) => {
                for (id, snapshot) in snapshots {
                    self.snapshots.insert(id, snapshot.clone(), now_ms);
                    out.insert(id, snapshot);
                }
            }
            Err(e) => {
                warn!(error = ?e, misses = misses.len(), "nation fetch failed; degrading to cached data");
            }
        }

        out
    }

    async fn check_slots(
        &self,
        snapshot: &NationSnapshot,
        channel_id: Option<&str>,
        now_ms: i64,
    ) -> anyhow::Result<()> {
        let open_off = open_slots(snapshot.offensive_wars);
        let open_def = open_slots(snapshot.defensive_wars);
        if open_off == 0 && open_def == 0 {
            return Ok(());
        }

        if self
            .ledger
            .fired_within(AlertKind::SlotOpen, snapshot.id, RADAR_COOLDOWN_MS, now_ms)
            .await?
        {
            self.counters
                .radar_skip_cooldown
                .fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        if let Some(channel) = channel_id {
            let text = format!(
                "War radar: {} (nation {}) has open slots ({} offensive, {} defensive)",
                snapshot.name, snapshot.id, open_off, open_def
            );
            if let Err(e) = self.delivery.post_to_channel(channel, &text).await {
                warn!(error = ?e, "slot-open post failed; counted as fired");
            }
        }

        self.ledger
            .record(LedgerEntry {
                kind: AlertKind::SlotOpen,
                subject_id: snapshot.id,
                // coarse bucket: offensive tens digit, defensive units
                value: open_off * 10 + open_def,
                fingerprint: slot_open_fingerprint(snapshot.id, open_off, open_def),
                created_ms: now_ms,
            })
            .await?;
        self.counters
            .slot_channel_alerts
            .fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    async fn check_beige(
        &self,
        snapshot: &NationSnapshot,
        channel_id: Option<&str>,
        now_ms: i64,
    ) -> anyhow::Result<()> {
        if snapshot.beige_turns <= 0 {
            return Ok(());
        }
        let minutes = minutes_until_beige_exit(snapshot.beige_turns);

        // Evaluated before any DM rows land: per-watcher entries share the
        // beige_soon kind and would otherwise trip the cooldown they sit
        // under.
        let channel_ok = !self
            .ledger
            .fired_within(AlertKind::BeigeSoon, snapshot.id, RADAR_COOLDOWN_MS, now_ms)
            .await?;

        let watchers = self.watches.watchers_of(snapshot.id).await?;
        let mut any_qualified = false;

        for watch in watchers
            .iter()
            .filter(|w| beige_lead_qualifies(w, minutes))
        {
            any_qualified = true;

            let fingerprint =
                beige_dm_fingerprint(snapshot.id, snapshot.beige_turns, &watch.user_id);
            if self.ledger.has_fired(&fingerprint).await? {
                continue;
            }

            let text = format!(
                "Beige alert: {} (nation {}) exits beige in about {} minutes",
                snapshot.name, snapshot.id, minutes
            );
            if let Err(e) = self
                .delivery
                .send_direct_message(&watch.user_id, &text)
                .await
            {
                warn!(error = ?e, user_id = %watch.user_id, "beige DM failed; counted as fired");
            }

            self.ledger
                .record(LedgerEntry {
                    kind: AlertKind::BeigeSoon,
                    subject_id: snapshot.id,
                    value: minutes,
                    fingerprint,
                    created_ms: now_ms,
                })
                .await?;
            self.counters.beige_dms.fetch_add(1, Ordering::Relaxed);
        }

        if !any_qualified {
            return Ok(());
        }

        if !channel_ok {
            self.counters
                .radar_skip_cooldown
                .fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        if let Some(channel) = channel_id {
            let text = format!(
                "Beige radar: {} (nation {}) exits beige in about {} minutes",
                snapshot.name, snapshot.id, minutes
            );
            if let Err(e) = self.delivery.post_to_channel(channel, &text).await {
                warn!(error = ?e, "beige post failed; counted as fired");
            }
        }

        self.ledger
            .record(LedgerEntry {
                kind: AlertKind::BeigeSoon,
                subject_id: snapshot.id,
                value: minutes,
                fingerprint: beige_fingerprint(snapshot.id, snapshot.beige_turns),
                created_ms: now_ms,
            })
            .await?;
        self.counters
            .beige_channel_alerts
            .fetch_add(1, Ordering::Relaxed);

        Ok(())
    }
}
