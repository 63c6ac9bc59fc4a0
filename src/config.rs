use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string.
    pub database_url: String,

    /// Connection pool ceiling. Both pollers share one pool.
    pub db_max_connections: u32,

    // =========================
    // Upstream game API
    // =========================
    /// Base URL of the game API.
    pub api_base_url: String,

    /// API key sent with every upstream request. Required; the process
    /// refuses to start without it.
    pub api_key: String,

    /// Per-request timeout for upstream HTTP calls. Without a bound one
    /// hung call can starve every subsequent tick.
    pub api_timeout_ms: u64,

    /// How many bank records to pull per deposit cycle. The upstream feed
    /// only exposes a fixed recent window; backlogs deeper than one page
    /// are knowingly skipped (lossy catch-up).
    pub bank_page_limit: usize,

    // =========================
    // Discord delivery
    // =========================
    /// Bot token for the delivery adapter. Required at startup.
    pub discord_token: String,

    /// Guild this instance serves (single-guild bootstrap).
    pub guild_id: String,

    // =========================
    // Polling cadence
    // =========================
    /// Deposit poller interval in milliseconds.
    pub deposit_poll_interval_ms: u64,

    /// Radar poller base interval in milliseconds. The actual sleep is
    /// jittered by +/-30% per cycle so multiple instances do not hammer
    /// the upstream API in lockstep.
    pub radar_poll_interval_ms: u64,

    /// TTL for the radar's nation-snapshot cache.
    pub snapshot_ttl_ms: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://sentinel_dev.db".to_string());

        let api_key = require("PNW_API_KEY")?;
        let discord_token = require("DISCORD_BOT_TOKEN")?;
        let guild_id = require("GUILD_ID")?;

        let api_base_url = std::env::var("PNW_API_BASE")
            .unwrap_or_else(|_| "https://api.politicsandwar.com".to_string());

        Ok(Self {
            database_url,
            db_max_connections: env_u64("DB_MAX_CONNECTIONS", 16)? as u32,
            api_base_url,
            api_key,
            api_timeout_ms: env_u64("API_TIMEOUT_MS", 10_000)?,
            bank_page_limit: env_u64("BANK_PAGE_LIMIT", 50)? as usize,
            discord_token,
            guild_id,
            deposit_poll_interval_ms: env_u64("DEPOSIT_POLL_INTERVAL_MS", 90_000)?,
            radar_poll_interval_ms: env_u64("RADAR_POLL_INTERVAL_MS", 90_000)?,
            snapshot_ttl_ms: env_u64("SNAPSHOT_TTL_MS", 60_000)? as i64,
        })
    }
}

fn require(name: &'static str) -> Result<String, AppError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::MissingEnv(name)),
    }
}

fn env_u64(name: &'static str, default: u64) -> Result<u64, AppError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(v) => v.parse().map_err(|_| AppError::InvalidEnv { name, value: v }),
    }
}
