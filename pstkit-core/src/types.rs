//! Core types: field kinds, line codes, region identities and parsed pst lines

use crate::constants::{CELLS_PER_NIBBLE, FEATURE_CODE, MAX_FIELD_WIDTH};
use crate::error::CodecError;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Terrain grid flavours.
///
/// FeatureMap and SailingMap share the 0x00/0xFF encoding; CoastMap uses
/// 0x00/0x09 with a threshold for land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKind {
    /// Land iff non-zero; anomalies are bytes other than 0x00 and 0xFF
    Feature,
    /// Same rule as `Feature`, but only anomalies are printed
    Sailing,
    /// Land iff above 4; anomalies are bytes other than 0x00 and 0x09
    Coast,
}

impl GridKind {
    /// Number of hex nibbles a grid of `cells` bytes packs into
    pub const fn nibbles(cells: usize) -> usize {
        cells.div_ceil(CELLS_PER_NIBBLE)
    }
}

/// The closed set of leaf encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Length-prefixed string (TEXT0)
    Text,
    /// Length-prefixed string followed by 8 bytes of padding (TEXT8)
    PaddedText,
    /// 4 bytes as dotted uppercase hex, most significant first
    Hex,
    /// Little-endian 32-bit integer
    Int,
    /// One byte as a bit string
    Binary,
    /// Little-endian 16-bit integer
    Short,
    /// Signed byte
    Char,
    /// Signed byte used by log entries
    LowChar,
    /// 32-bit integer scaled by 1/1000
    MilliFloat,
    /// 32-bit integer scaled by 1/1000000
    MicroFloat,
    /// One byte per cell terrain grid
    Grid(GridKind),
    /// Raw lowercase hex of any width
    Bulk,
    /// Bytes that must all be zero
    Zero,
}

impl FieldKind {
    /// Letter code written in front of the width in a pst line
    pub const fn code(self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::PaddedText => "t",
            FieldKind::Hex => "h",
            FieldKind::Int => "V",
            FieldKind::Binary => "B",
            FieldKind::Short => "s",
            FieldKind::Char => "C",
            FieldKind::LowChar => "c",
            FieldKind::MilliFloat => "g",
            FieldKind::MicroFloat => "G",
            FieldKind::Grid(GridKind::Feature) => "M",
            FieldKind::Grid(GridKind::Sailing) => "m",
            FieldKind::Grid(GridKind::Coast) => "MM",
            FieldKind::Bulk => "H",
            FieldKind::Zero => "x",
        }
    }

    /// Width a rule gets when it does not name one.
    ///
    /// Zero means the kind has no fixed width of its own.
    pub const fn default_width(self) -> usize {
        match self {
            FieldKind::Text | FieldKind::Zero | FieldKind::Grid(_) => 0,
            FieldKind::PaddedText => 8,
            FieldKind::Int
            | FieldKind::Hex
            | FieldKind::MilliFloat
            | FieldKind::MicroFloat
            | FieldKind::Bulk => 4,
            FieldKind::Short => 2,
            FieldKind::Binary | FieldKind::Char | FieldKind::LowChar => 1,
        }
    }

    /// Width a numeric kind must be read at, if it is a numeric kind
    pub const fn numeric_width(self) -> Option<usize> {
        match self {
            FieldKind::Int
            | FieldKind::Hex
            | FieldKind::MilliFloat
            | FieldKind::MicroFloat => Some(4),
            FieldKind::Short => Some(2),
            FieldKind::Binary | FieldKind::Char | FieldKind::LowChar => Some(1),
            _ => None,
        }
    }

    /// Check if this is a terrain grid
    pub const fn is_grid(self) -> bool {
        matches!(self, FieldKind::Grid(_))
    }

    /// Check if this is one of the length-prefixed string kinds
    pub const fn is_text(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::PaddedText)
    }
}

/// Kind code plus width, as printed in the second column of a pst line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCode {
    /// A regular field
    Field {
        /// Field encoding
        kind: FieldKind,
        /// Declared width in bytes
        width: usize,
    },
    /// A grid anomaly line (`F1`)
    Feature,
}

impl LineCode {
    /// Parse a code such as `V4`, `H16`, `MM293` or `F1`
    pub fn parse(code: &str) -> Option<Self> {
        if code == FEATURE_CODE {
            return Some(LineCode::Feature);
        }
        let split = code
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(code.len());
        let (letters, digits) = code.split_at(split);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let width: usize = digits.parse().ok().filter(|&w| w <= MAX_FIELD_WIDTH)?;
        let kind = match letters {
            "t" if width == 0 => FieldKind::Text,
            "t" if width == 8 => FieldKind::PaddedText,
            "h" => FieldKind::Hex,
            "V" => FieldKind::Int,
            "B" => FieldKind::Binary,
            "s" => FieldKind::Short,
            "C" => FieldKind::Char,
            "c" => FieldKind::LowChar,
            "g" => FieldKind::MilliFloat,
            "G" => FieldKind::MicroFloat,
            "M" => FieldKind::Grid(GridKind::Feature),
            "m" => FieldKind::Grid(GridKind::Sailing),
            "MM" => FieldKind::Grid(GridKind::Coast),
            "H" => FieldKind::Bulk,
            "x" => FieldKind::Zero,
            _ => return None,
        };
        Some(LineCode::Field { kind, width })
    }
}

impl fmt::Display for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineCode::Field { kind, width } => write!(f, "{}{}", kind.code(), width),
            LineCode::Feature => f.write_str(FEATURE_CODE),
        }
    }
}

/// Structured identity of a region instance: `Ship_3_0_2` is base `Ship`
/// with index path `[3, 0, 2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RegionId {
    /// Top-level section name
    pub base: String,
    /// Instance indices, outermost first
    pub indices: Vec<u32>,
}

impl RegionId {
    /// Identity of a top-level section (no indices yet)
    pub fn section(base: &str) -> Self {
        Self {
            base: base.to_string(),
            indices: Vec::new(),
        }
    }

    /// Identity of instance `index` below this one
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self {
            base: self.base.clone(),
            indices,
        }
    }

    /// Parse `Base_1_2` into its parts
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('_');
        let base = parts.next().filter(|b| !b.is_empty())?;
        let indices = parts
            .map(|p| p.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            base: base.to_string(),
            indices,
        })
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        for index in &self.indices {
            write!(f, "_{}", index)?;
        }
        Ok(())
    }
}

/// An anomalous grid cell, reported out of band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// `<grid region>_<cell index>`
    pub line_code: String,
    /// Raw byte found in the cell
    pub value: u8,
}

/// One parsed pst line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PstLine {
    /// Region identifier as written (grids carry their `_<width>` suffix)
    pub id: String,
    /// Kind and width, or the feature code
    pub code: LineCode,
    /// Value column with separator padding removed
    pub value: String,
}

impl PstLine {
    /// Parse a pst line. Returns `Ok(None)` for blank and `#` comment lines.
    ///
    /// The comment/translation column is ignored. String values keep
    /// their inner spacing; every other value is trimmed.
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>, CodecError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let bytes = line.as_bytes();
        let malformed = |reason: &str| CodecError::MalformedLine {
            line: line_no,
            reason: reason.to_string(),
        };

        let first = memchr::memchr(b':', bytes).ok_or_else(|| malformed("missing code column"))?;
        let second = memchr::memchr(b':', &bytes[first + 1..])
            .map(|p| first + 1 + p)
            .ok_or_else(|| malformed("missing value column"))?;
        let value_end = memchr::memchr(b':', &bytes[second + 1..])
            .map(|p| second + 1 + p)
            .unwrap_or(bytes.len());

        let id = line[..first].trim();
        if id.is_empty() {
            return Err(malformed("empty identifier"));
        }
        let code_text = line[first + 1..second].trim();
        let code = LineCode::parse(code_text)
            .ok_or_else(|| malformed(&format!("unknown code {:?}", code_text)))?;

        let raw = &line[second + 1..value_end];
        let value = match code {
            LineCode::Field { kind, .. } if kind.is_text() => strip_padding(raw),
            _ => raw.trim(),
        };

        Ok(Some(Self {
            id: id.to_string(),
            code,
            value: value.to_string(),
        }))
    }
}

/// Remove up to three spaces of separator padding on each side
fn strip_padding(raw: &str) -> &str {
    let mut value = raw;
    for _ in 0..3 {
        value = value.strip_prefix(' ').unwrap_or(value);
        value = value.strip_suffix(' ').unwrap_or(value);
    }
    value
}
