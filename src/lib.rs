pub mod api;
pub mod cache;
pub mod config;
pub mod cursor;
pub mod db;
pub mod delivery;
pub mod deposit;
pub mod guild;
pub mod ledger;
pub mod link;
pub mod metrics;
pub mod notional;
pub mod radar;
pub mod range;
pub mod watch;

pub mod error;
pub mod logger;
pub mod time;
