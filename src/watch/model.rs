/// One user's subscription to one subject nation.
///
/// Threshold fields are `None` when the watch inherits the guild default;
/// the pollers resolve inheritance at decision time because it needs
/// runtime context (the watcher's own linked nation, the guild floor).
#[derive(Clone, Debug, PartialEq)]
pub struct Watch {
    pub user_id: String,
    pub subject_id: i64,
    pub dm_enabled: bool,
    pub bank_abs_usd_floor: Option<f64>,
    pub beige_lead_minutes: Option<i64>,
    pub in_range_only: bool,
}

impl Watch {
    /// Fresh watch with documented defaults; overrides come in via patch.
    pub fn new(user_id: &str, subject_id: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            subject_id,
            dm_enabled: true,
            bank_abs_usd_floor: None,
            beige_lead_minutes: None,
            in_range_only: false,
        }
    }

    /// Field-by-field merge: supplied fields override, omitted fields keep
    /// their stored value.
    pub fn apply(&mut self, patch: &WatchPatch) {
        if let Some(v) = patch.dm_enabled {
            self.dm_enabled = v;
        }
        if let Some(v) = patch.bank_abs_usd_floor {
            self.bank_abs_usd_floor = Some(v);
        }
        if let Some(v) = patch.beige_lead_minutes {
            self.beige_lead_minutes = Some(v);
        }
        if let Some(v) = patch.in_range_only {
            self.in_range_only = v;
        }
    }
}

/// Partial update for `upsert_watch`.
#[derive(Clone, Debug, Default)]
pub struct WatchPatch {
    pub dm_enabled: Option<bool>,
    pub bank_abs_usd_floor: Option<f64>,
    pub beige_lead_minutes: Option<i64>,
    pub in_range_only: Option<bool>,
}
