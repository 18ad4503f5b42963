// Single source of truth for all default values.

// --- Store ---
pub const DEFAULT_STORE_FILENAME: &str = "visits.dat";
pub const DEFAULT_MAX_VISITS: usize = 10;
