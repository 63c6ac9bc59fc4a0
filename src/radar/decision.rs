//! Pure decision logic for the war radar.

use crate::radar::{DEFAULT_BEIGE_LEAD_MINUTES, MINUTES_PER_TURN, WAR_SLOTS};
use crate::watch::model::Watch;

/// Open slots on one side. Upstream war counts occasionally run past the
/// slot cap during settlement; clamp rather than report negative capacity.
pub fn open_slots(active_war_count: i64) -> i64 {
    WAR_SLOTS - active_war_count.clamp(0, WAR_SLOTS)
}

/// Estimated minutes until a nation leaves beige.
pub fn minutes_until_beige_exit(beige_turns_remaining: i64) -> i64 {
    beige_turns_remaining.max(0) * MINUTES_PER_TURN
}

/// A watcher qualifies for an early beige DM once their configured lead
/// time covers the remaining beige estimate.
pub fn beige_lead_qualifies(watch: &Watch, minutes_until_exit: i64) -> bool {
    let lead = watch
        .beige_lead_minutes
        .unwrap_or(DEFAULT_BEIGE_LEAD_MINUTES);
    lead >= minutes_until_exit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_slots_clamp_war_counts() {
        assert_eq!(open_slots(0), 3);
        assert_eq!(open_slots(2), 1);
        assert_eq!(open_slots(3), 0);
        // settlement glitches
        assert_eq!(open_slots(5), 0);
        assert_eq!(open_slots(-1), 3);
    }

    #[test]
    fn beige_estimate_uses_turn_length() {
        assert_eq!(minutes_until_beige_exit(0), 0);
        assert_eq!(minutes_until_beige_exit(1), 120);
        assert_eq!(minutes_until_beige_exit(3), 360);
        assert_eq!(minutes_until_beige_exit(-2), 0);
    }

    #[test]
    fn lead_time_defaults_to_sixty_minutes() {
        let w = Watch::new("u1", 9);
        assert!(beige_lead_qualifies(&w, 60));
        assert!(!beige_lead_qualifies(&w, 61));

        let mut long = Watch::new("u2", 9);
        long.beige_lead_minutes = Some(240);
        assert!(beige_lead_qualifies(&long, 240));
        assert!(!beige_lead_qualifies(&long, 241));
    }
}
