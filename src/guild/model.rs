/// Per-guild alerting configuration.
///
/// Rows are created lazily: absence means "documented defaults", never an
/// error.
#[derive(Clone, Debug, PartialEq)]
pub struct GuildConfig {
    pub guild_id: String,
    /// Tolerance band outside the declare window, in percent.
    pub near_range_percent: f64,
    /// Minimum notional USD before a deposit is worth a channel post.
    pub deposit_floor_abs_usd: f64,
    /// Reserved: relative floor as a percent of the receiver's holdings.
    /// Carried in config but not yet consulted by the decision logic.
    pub deposit_floor_rel_percent: f64,
    pub poll_interval_ms: i64,
    /// Whether a fresh watch starts with DMs on.
    pub dm_on_subscribe: bool,
    /// When set, channel posts require a primary-linked nation in the guild
    /// to be in or near range of the receiver. Default off.
    pub in_range_only: bool,
    pub alert_channel_id: Option<String>,
}

impl GuildConfig {
    pub fn default_for(guild_id: &str) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            near_range_percent: 5.0,
            deposit_floor_abs_usd: 10_000_000.0,
            deposit_floor_rel_percent: 20.0,
            poll_interval_ms: 90_000,
            dm_on_subscribe: true,
            in_range_only: false,
            alert_channel_id: None,
        }
    }
}
