use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    // User -> nation links
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS nation_links (
  user_id TEXT NOT NULL,
  nation_id BIGINT NOT NULL,
  guild_id TEXT NOT NULL,
  is_primary INTEGER NOT NULL DEFAULT 0 CHECK (is_primary IN (0,1)),
  linked_ms BIGINT NOT NULL,
  PRIMARY KEY (user_id, nation_id)
);
"#,
    )
    .execute(pool)
    .await?;

    // At most one primary link per user, enforced by the store rather than
    // by insert ordering.
    sqlx::query(
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_links_one_primary
           ON nation_links(user_id) WHERE is_primary = 1;"#,
    )
    .execute(pool)
    .await?;

    // Guild settings, one row per guild, created lazily
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS guild_settings (
  guild_id TEXT PRIMARY KEY,
  near_range_percent DOUBLE PRECISION NOT NULL,
  deposit_floor_abs_usd DOUBLE PRECISION NOT NULL,
  deposit_floor_rel_percent DOUBLE PRECISION NOT NULL,
  poll_interval_ms BIGINT NOT NULL,
  dm_on_subscribe INTEGER NOT NULL CHECK (dm_on_subscribe IN (0,1)),
  in_range_only INTEGER NOT NULL CHECK (in_range_only IN (0,1)),
  alert_channel_id TEXT
);
"#,
    )
    .execute(pool)
    .await?;

    // Append-only alert ledger (dedup + cooldown index)
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS alert_ledger (
  kind TEXT NOT NULL,
  subject_id BIGINT NOT NULL,
  value BIGINT NOT NULL,
  fingerprint TEXT NOT NULL,
  created_ms BIGINT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    // Per-stream polling cursors
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS event_cursors (
  stream TEXT PRIMARY KEY,
  last_event_id BIGINT,
  last_seen_ms BIGINT
);
"#,
    )
    .execute(pool)
    .await?;

    // Watch registry
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS watches (
  user_id TEXT NOT NULL,
  subject_id BIGINT NOT NULL,
  dm_enabled INTEGER NOT NULL CHECK (dm_enabled IN (0,1)),
  bank_abs_usd_floor DOUBLE PRECISION,
  beige_lead_minutes BIGINT,
  in_range_only INTEGER NOT NULL CHECK (in_range_only IN (0,1)),
  PRIMARY KEY (user_id, subject_id)
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_ledger_fingerprint ON alert_ledger(fingerprint);"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_ledger_cooldown
           ON alert_ledger(kind, subject_id, created_ms);"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_watches_subject ON watches(subject_id);"#)
        .execute(pool)
        .await?;

    Ok(())
}
