//! Constants and limits for the savegame and pst formats

/// Longest length-prefixed string accepted in either direction
pub const MAX_TEXT_LEN: usize = 100;

/// Trailing padding after a padded (TEXT8) string
pub const TEXT_PADDING: usize = 8;

/// Size of the little-endian length prefix in front of every string
pub const TEXT_LEN_PREFIX: usize = 4;

/// Region whose arrival triggers the starting-year capture.
///
/// The savegame has variable-length parts at both ends and a large fixed
/// section in the middle; this is the first leaf of the fixed section.
pub const STARTING_YEAR_SENTINEL: &str = "Personal_0";

/// Distance from the end of the sentinel leaf to the starting-year integer
pub const STARTING_YEAR_JUMP: i64 = 887_272;

/// Widest leaf a pst line may declare; the largest savegame leaf is 1014 bytes
pub const MAX_FIELD_WIDTH: usize = 1 << 16;

/// Cells packed into one hex nibble of a terrain grid
pub const CELLS_PER_NIBBLE: usize = 4;

/// Canonical land byte for FeatureMap and SailingMap cells
pub const LAND_SENTINEL: u8 = 0xFF;

/// Canonical boundary (land) byte for CoastMap cells
pub const COAST_SENTINEL: u8 = 9;

/// CoastMap cells above this value count as land
pub const COAST_LAND_THRESHOLD: u8 = 4;

/// Canonical sea byte for every grid
pub const SEA: u8 = 0;

/// Value text of a zero-fill field
pub const ZERO_STRING: &str = "zero_string";

/// Line code of a grid anomaly line
pub const FEATURE_CODE: &str = "F1";

/// Separator between the columns of a field line
pub const FIELD_SEPARATOR: &str = "   :   ";

/// Separator between the columns of a feature line
pub const FEATURE_SEPARATOR: &str = "  :  ";

/// Divisor of the milli fixed-point kind
pub const MILLI_SCALE: i64 = 1_000;

/// Divisor of the micro fixed-point kind
pub const MICRO_SCALE: i64 = 1_000_000;
