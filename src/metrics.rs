use std::sync::Arc;
use std::sync::atomic::AtomicU64;

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub deposit_cycles: Arc<AtomicU64>,
    pub deposit_posts: Arc<AtomicU64>,
    pub deposit_dms: Arc<AtomicU64>,

    // skip reasons
    pub deposit_skip_floor: Arc<AtomicU64>,
    pub deposit_skip_dup: Arc<AtomicU64>,
    pub deposit_skip_gate: Arc<AtomicU64>,

    pub radar_cycles: Arc<AtomicU64>,
    pub beige_channel_alerts: Arc<AtomicU64>,
    pub beige_dms: Arc<AtomicU64>,
    pub slot_channel_alerts: Arc<AtomicU64>,
    pub radar_skip_cooldown: Arc<AtomicU64>,
}
