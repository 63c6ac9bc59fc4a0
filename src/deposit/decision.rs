//! Pure decision logic for deposit alerts.
//!
//! Everything here is synchronous and side-effect free so the poller's
//! fan-out rules can be exercised without a database or a network.

use crate::range::classify;
use crate::watch::model::Watch;

/// Guild floor check. Below-floor events are skipped without a ledger
/// write; the cursor still advances past them.
pub fn passes_floor(notional_usd: f64, floor_usd: f64) -> bool {
    notional_usd >= floor_usd
}

/// Guild-level channel gate (reserved feature, default off).
///
/// When enabled, a channel post requires at least one primary-linked nation
/// in the guild to be in or near declare range of the receiver. Missing
/// scores fail closed: no data means no post, not a crash.
pub fn channel_gate_passes(
    gate_enabled: bool,
    primary_scores: &[f64],
    receiver_score: Option<f64>,
    near_range_percent: f64,
) -> bool {
    if !gate_enabled {
        return true;
    }
    let Some(receiver) = receiver_score else {
        return false;
    };
    primary_scores
        .iter()
        .any(|s| classify(*s, receiver, near_range_percent).is_reachable())
}

/// The floor a specific watcher is held to: their own override, else the
/// guild default.
pub fn watcher_floor(watch: &Watch, guild_floor_usd: f64) -> f64 {
    watch.bank_abs_usd_floor.unwrap_or(guild_floor_usd)
}

/// Per-watcher range gate. Only applies when the watch opted in; then the
/// watcher's own linked nation must be in or near range of the receiver,
/// and a missing score on either side skips silently.
pub fn watcher_range_ok(
    watch: &Watch,
    watcher_score: Option<f64>,
    receiver_score: Option<f64>,
    near_range_percent: f64,
) -> bool {
    if !watch.in_range_only {
        return true;
    }
    match (watcher_score, receiver_score) {
        (Some(w), Some(r)) => classify(w, r, near_range_percent).is_reachable(),
        _ => false,
    }
}
