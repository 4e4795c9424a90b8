/// Application name
pub const APP_NAME: &str = "Gigboard";

/// Storage key of the Gigs collection
pub const KEY_GIGS: &str = "gigs";

/// Storage key of the Applications collection
pub const KEY_APPLICATIONS: &str = "applications";

/// Storage key of the Transactions collection
pub const KEY_TRANSACTIONS: &str = "transactions";

/// Storage key of the Conversations collection
pub const KEY_CONVERSATIONS: &str = "conversations";

/// Storage key of the Messages collection
pub const KEY_MESSAGES: &str = "messages";

/// Per-role notification collections are stored under `notifications_<role>`
pub const KEY_NOTIFICATIONS_PREFIX: &str = "notifications_";

/// Key holding the layout version written by seeding
pub const KEY_SCHEMA_VERSION: &str = "gigboard_schema_version";

/// Current persisted layout version
pub const SCHEMA_VERSION: u32 = 1;

/// Platform fee taken from a completed gig's pay (10%)
pub const DEFAULT_PLATFORM_FEE_RATE: f64 = 0.10;

/// Fallback refresh interval for views that poll the store, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Capacity of the cross-context change channel
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;
