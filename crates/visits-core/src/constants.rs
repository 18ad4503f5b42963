// Process-wide constants shared by the store and its codec.

/// Terminator byte stored after every string in the persisted image.
pub const STRING_TERMINATOR: u8 = 0;

/// Nanoseconds in one second; upper bound (exclusive) of `Timestamp::nanos`.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Environment variable overriding `StoreConfig::path`.
pub const ENV_STORE_PATH: &str = "VISITS_PATH";

/// Environment variable overriding `StoreConfig::max_visits`.
pub const ENV_MAX_VISITS: &str = "VISITS_MAX_VISITS";
