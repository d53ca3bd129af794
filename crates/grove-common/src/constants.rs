//! System-wide constants for Grove.

// =============================================================================
// Key and Value Limits
// =============================================================================

/// Maximum key size in bytes (10 KB).
pub const MAX_KEY_SIZE: usize = 10 * 1024;

/// Maximum value size in bytes (100 KB).
pub const MAX_VALUE_SIZE: usize = 100 * 1024;

// =============================================================================
// Key Layout
// =============================================================================

/// First byte of every group data key.
pub const GROUP_DATA_SUBSPACE: u8 = 0x10;

/// First byte of every index key.
pub const INDEX_DATA_SUBSPACE: u8 = 0x11;

/// Name of the column added to tables declared without a primary key.
pub const HIDDEN_PK_COLUMN: &str = "__row_id";

// =============================================================================
// Collation
// =============================================================================

/// Collation id reserved for binary (code point) ordering.
pub const BINARY_COLLATION_ID: u32 = 0;

/// First id handed out to a named collation scheme.
pub const FIRST_COLLATION_ID: u32 = 1;

/// Default number of collation recipes kept alive.
pub const DEFAULT_COLLATION_CACHE_CAPACITY: usize = 64;

/// Default collation handle lifetime since last use, in seconds.
pub const DEFAULT_COLLATION_TTL_SECS: u64 = 300;

// =============================================================================
// Scanning
// =============================================================================

/// Default number of entries fetched per store read during a range scan.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 256;

// =============================================================================
// Spatial
// =============================================================================

/// Maximum total bits a z-value can carry.
///
/// The top bit stays clear and the low six bits record the bit count.
pub const MAX_Z_BITS: u32 = 57;

/// Default bits given to latitude.
pub const DEFAULT_LATITUDE_BITS: u32 = 28;

/// Default bits given to longitude.
pub const DEFAULT_LONGITUDE_BITS: u32 = 29;
