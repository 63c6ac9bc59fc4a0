//! Alert ledger rows and fingerprint construction.
//!
//! The upstream feeds are at-least-once; the ledger converts that into
//! at-most-once logical alerts. Deposit alerts dedup on exact fingerprint
//! equality; radar alerts dedup on a per-(kind, subject) cooldown window,
//! with the fingerprint encoding a coarse state bucket so a material state
//! change re-alerts after the window.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Deposit,
    DepositWatchDm,
    BeigeSoon,
    SlotOpen,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Deposit => "deposit",
            AlertKind::DepositWatchDm => "deposit_watch_dm",
            AlertKind::BeigeSoon => "beige_soon",
            AlertKind::SlotOpen => "slot_open",
        }
    }

    pub fn from_str(s: &str) -> Option<AlertKind> {
        match s {
            "deposit" => Some(AlertKind::Deposit),
            "deposit_watch_dm" => Some(AlertKind::DepositWatchDm),
            "beige_soon" => Some(AlertKind::BeigeSoon),
            "slot_open" => Some(AlertKind::SlotOpen),
            _ => None,
        }
    }
}

/// Immutable, append-only record of one fired alert.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerEntry {
    pub kind: AlertKind,
    pub subject_id: i64,
    /// Rounded USD for deposits; coarse state bucket for radar kinds.
    pub value: i64,
    pub fingerprint: String,
    pub created_ms: i64,
}

/// Same upstream event, same receiver, same rounded value: never posts twice.
pub fn deposit_fingerprint(event_id: i64, receiver_id: i64, usd_rounded: i64) -> String {
    format!("deposit:{event_id}:{receiver_id}:{usd_rounded}")
}

/// Per-watcher dedup rides on the deposit fingerprint.
pub fn deposit_dm_fingerprint(event_id: i64, receiver_id: i64, usd_rounded: i64, watcher: &str) -> String {
    format!(
        "{}:dm:{watcher}",
        deposit_fingerprint(event_id, receiver_id, usd_rounded)
    )
}

/// Buckets on the remaining turn count: the fingerprint changes exactly when
/// the underlying state decays.
pub fn beige_fingerprint(subject_id: i64, turns_remaining: i64) -> String {
    format!("beige_soon:{subject_id}:t{turns_remaining}")
}

/// One-shot-until-state-changes per watcher. Without the turn bucket a
/// watcher inside their lead window would be re-DM'd every cycle;
/// exact-match dedup suppresses the repetition while still re-alerting
/// when the turn count decays.
pub fn beige_dm_fingerprint(subject_id: i64, turns_remaining: i64, watcher: &str) -> String {
    format!("{}:dm:{watcher}", beige_fingerprint(subject_id, turns_remaining))
}

pub fn slot_open_fingerprint(subject_id: i64, open_offensive: i64, open_defensive: i64) -> String {
    format!("slot_open:{subject_id}:o{open_offensive}:d{open_defensive}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprints_are_deterministic_and_distinct() {
        let f = deposit_fingerprint(42, 1001, 12_000_000);
        assert_eq!(f, deposit_fingerprint(42, 1001, 12_000_000));
        assert_ne!(f, deposit_fingerprint(43, 1001, 12_000_000));
        assert_ne!(f, deposit_fingerprint(42, 1002, 12_000_000));

        let dm = deposit_dm_fingerprint(42, 1001, 12_000_000, "u1");
        assert!(dm.starts_with(&f));
        assert_ne!(dm, deposit_dm_fingerprint(42, 1001, 12_000_000, "u2"));
    }

    #[test]
    fn beige_bucket_changes_with_turns() {
        assert_ne!(beige_fingerprint(9, 2), beige_fingerprint(9, 1));
        assert_ne!(
            beige_dm_fingerprint(9, 2, "u1"),
            beige_dm_fingerprint(9, 1, "u1")
        );
    }

    #[test]
    fn kind_round_trips_through_db_strings() {
        for kind in [
            AlertKind::Deposit,
            AlertKind::DepositWatchDm,
            AlertKind::BeigeSoon,
            AlertKind::SlotOpen,
        ] {
            assert_eq!(AlertKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(AlertKind::from_str("nope"), None);
    }
}
