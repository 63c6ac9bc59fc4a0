pub mod decision;
pub mod poller;

/// A game turn lasts two hours; beige decays one turn at a time.
pub const MINUTES_PER_TURN: i64 = 120;

/// Lead time used for beige DMs when a watch does not set its own.
pub const DEFAULT_BEIGE_LEAD_MINUTES: i64 = 60;

/// Cooldown window applied to radar channel alerts.
pub const RADAR_COOLDOWN_MS: i64 = 30 * 60 * 1_000;

/// Each nation has exactly three offensive and three defensive war slots.
pub const WAR_SLOTS: i64 = 3;
