pub mod decision;
pub mod poller;

/// Cursor stream name for the bank-record feed. Keyed separately from the
/// radar's state so the two pollers never contend on one row.
pub const BANK_STREAM: &str = "bankrecs";
