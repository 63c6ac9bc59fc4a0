use std::sync::Arc;
use std::time::Duration;

use pnw_sentinel::{
    api::client::PnwClient,
    config::AppConfig,
    cursor::repository_sqlx::SqlxCursorRepository,
    db::Db,
    delivery::DiscordRest,
    deposit::poller::DepositPoller,
    guild::repository_sqlx::SqlxGuildConfigRepository,
    ledger::repository_sqlx::SqlxLedgerRepository,
    link::repository_sqlx::SqlxLinkRepository,
    logger::init_tracing,
    metrics::Counters,
    radar::poller::RadarPoller,
    watch::repository_sqlx::SqlxWatchRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sqlx::any::install_default_drivers();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    tracing::info!("Starting pnw-sentinel...");

    // The only fatal failure class: missing credentials or an unreachable
    // database. Everything past startup is cycle-scoped and self-healing.
    let cfg = AppConfig::from_env()?;

    let db = Db::connect(&cfg.database_url, cfg.db_max_connections).await?;
    db.migrate().await?;
    let pool = db.pool.as_ref().clone();

    let api = Arc::new(PnwClient::new(
        cfg.api_base_url.clone(),
        cfg.api_key.clone(),
        Duration::from_millis(cfg.api_timeout_ms),
    )?);
    let delivery = Arc::new(DiscordRest::new(
        cfg.discord_token.clone(),
        Duration::from_millis(cfg.api_timeout_ms),
    )?);

    let cursors = Arc::new(SqlxCursorRepository::new(pool.clone()));
    let ledger = Arc::new(SqlxLedgerRepository::new(pool.clone()));
    let watches = Arc::new(SqlxWatchRepository::new(pool.clone()));
    let guilds = Arc::new(SqlxGuildConfigRepository::new(pool.clone()));
    let links = Arc::new(SqlxLinkRepository::new(pool));

    let counters = Counters::default();

    let deposit = Arc::new(DepositPoller::new(
        cfg.guild_id.clone(),
        cfg.bank_page_limit,
        api.clone(),
        delivery.clone(),
        cursors,
        ledger.clone(),
        watches.clone(),
        guilds.clone(),
        links,
        counters.clone(),
    ));
    tokio::spawn(deposit.run(Duration::from_millis(cfg.deposit_poll_interval_ms)));

    let radar = Arc::new(RadarPoller::new(
        cfg.guild_id.clone(),
        cfg.snapshot_ttl_ms,
        api,
        delivery,
        ledger,
        watches,
        guilds,
        counters,
    ));
    tokio::spawn(radar.run(Duration::from_millis(cfg.radar_poll_interval_ms)));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    Ok(())
}
