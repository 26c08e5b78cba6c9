/// Initial rating for a player record created on first comparison
pub const DEFAULT_RATING: f64 = 1500.0;

/// Base K-factor before heuristics
pub const DEFAULT_BASE_K: f64 = 24.0;

/// Debounce window for coalescing snapshot writes (milliseconds)
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Maximum attempts to draw a pair that differs from the previous one
pub const MAX_PAIR_RETRIES: u32 = 10;

/// Default opponent sample size for similarity matchmaking
pub const DEFAULT_SAMPLE_SIZE: usize = 12;

/// Upper bound for the low-matches bias exponent
pub const MAX_BIAS_EXPONENT: f64 = 3.0;

/// Version of the persisted snapshot envelope
pub const SNAPSHOT_VERSION: u32 = 1;

/// Version of the embedded rating store
pub const STORE_VERSION: u32 = 1;
