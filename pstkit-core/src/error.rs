//! Error types for pstkit operations

use alloc::string::String;

/// Errors that can occur while unpacking or packing a savegame.
///
/// Every variant is fatal for the run: the stream cursor is no longer on a
/// region boundary once one of these is raised.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Declared string length exceeds the safety bound
    #[cfg_attr(feature = "std", error("Oversized field {region}: length {length} exceeds {limit}"))]
    OversizedField {
        /// Region being decoded.
        region: String,
        /// The declared length.
        length: u64,
        /// The bound it exceeded.
        limit: usize,
    },

    /// Zero-fill region holds a non-zero byte
    #[cfg_attr(feature = "std", error("Non-zero byte in zero field {region} at offset {offset}"))]
    NonZeroInZeroField {
        /// Region being decoded.
        region: String,
        /// Offset of the first non-zero byte within the region.
        offset: usize,
    },

    /// Uniform split does not divide the parent evenly
    #[cfg_attr(
        feature = "std",
        error("Error decoding {region}: width {width} is not divisible by {leaf_width}")
    )]
    NonDivisibleWidth {
        /// Region being split.
        region: String,
        /// Parent width in bytes.
        width: usize,
        /// Width of the new leaf kind.
        leaf_width: usize,
    },

    /// Heterogeneous split children do not add up to the parent
    #[cfg_attr(
        feature = "std",
        error("Error decoding {region}: subsections don't add up: {actual} != {expected}")
    )]
    SubsectionSizeMismatch {
        /// Region being split.
        region: String,
        /// Parent width in bytes.
        expected: usize,
        /// Sum of the children.
        actual: usize,
    },

    /// Stream ended before a region was complete
    #[cfg_attr(feature = "std", error("Truncated stream in {region}: needed {needed} more bytes"))]
    TruncatedStream {
        /// Region being read.
        region: String,
        /// Bytes the read asked for.
        needed: usize,
    },

    /// Value text cannot be turned back into bytes
    #[cfg_attr(feature = "std", error("Malformed value for {region}: {value:?} ({reason})"))]
    MalformedValue {
        /// Region of the line.
        region: String,
        /// The offending value text.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Fixed-width kind requested at another width
    #[cfg_attr(feature = "std", error("Incorrect width {width} for {kind} field {region}"))]
    KindWidthMismatch {
        /// Region being decoded or encoded.
        region: String,
        /// Code of the kind.
        kind: String,
        /// Requested width.
        width: usize,
    },

    /// A pst line does not have the `id : code : value` shape
    #[cfg_attr(feature = "std", error("Malformed line {line}: {reason}"))]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Strict packing found a line the schema does not expect
    #[cfg_attr(
        feature = "std",
        error("Layout mismatch at line {line}: expected {expected}, found {found}")
    )]
    LayoutMismatch {
        /// 1-based line number.
        line: usize,
        /// Identifier and code the schema expects.
        expected: String,
        /// Identifier and code present in the file.
        found: String,
    },

    /// Schema rule key could not be parsed
    #[cfg_attr(feature = "std", error("Invalid rule key: {0}"))]
    InvalidRuleKey(String),

    /// Starting-year sentinel must jump forward
    #[cfg_attr(
        feature = "std",
        error("Invalid sentinel after {region}: jump {jump} is not positive")
    )]
    InvalidSentinel {
        /// Region the sentinel follows.
        region: String,
        /// The rejected jump.
        jump: i64,
    },

    /// IO error during read/write
    #[cfg_attr(feature = "std", error("IO error: {0}"))]
    Io(String),
}

impl CodecError {
    pub(crate) fn malformed(region: &str, value: &str, reason: &str) -> Self {
        CodecError::MalformedValue {
            region: region.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}
