/// A Discord user's claim on a nation. At most one primary link per user;
/// setting a new primary demotes the old row rather than deleting it.
#[derive(Clone, Debug, PartialEq)]
pub struct NationLink {
    pub user_id: String,
    pub nation_id: i64,
    pub guild_id: String,
    pub is_primary: bool,
    pub linked_ms: i64,
}
