//! Bit-grid compressor for the terrain maps
//!
//! Each map row stores one byte per cell. Cells hold 0x00 (sea), a land
//! sentinel, or occasionally something else. The text form keeps one bit
//! per cell, four cells per hex nibble with the lowest cell index in the
//! most significant bit, and reports every other byte as a feature.

use crate::constants::{CELLS_PER_NIBBLE, COAST_LAND_THRESHOLD, COAST_SENTINEL, LAND_SENTINEL, SEA};
use crate::error::CodecError;
use crate::types::GridKind;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// A grid row reduced to its packed nibbles plus its anomalous cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedGrid {
    /// Lowercase hex nibbles, empty for the sailing overlay
    pub text: String,
    /// `(cell index, raw byte)` in cell order
    pub anomalies: Vec<(usize, u8)>,
}

impl GridKind {
    /// Whether a raw cell byte counts as land
    pub const fn is_land(self, byte: u8) -> bool {
        match self {
            GridKind::Feature | GridKind::Sailing => byte != SEA,
            GridKind::Coast => byte > COAST_LAND_THRESHOLD,
        }
    }

    /// Byte written back for a land cell that carries no feature
    pub const fn land_sentinel(self) -> u8 {
        match self {
            GridKind::Feature | GridKind::Sailing => LAND_SENTINEL,
            GridKind::Coast => COAST_SENTINEL,
        }
    }

    /// Whether a raw cell byte has to be reported as a feature
    pub const fn is_anomaly(self, byte: u8) -> bool {
        byte != SEA && byte != self.land_sentinel()
    }
}

/// Compress one grid row
pub fn compress(kind: GridKind, cells: &[u8]) -> CompressedGrid {
    let mut nibbles = vec![0u8; GridKind::nibbles(cells.len())];
    let mut anomalies = Vec::new();

    for (i, &byte) in cells.iter().enumerate() {
        if kind.is_land(byte) {
            nibbles[i / CELLS_PER_NIBBLE] |= 0b1000 >> (i % CELLS_PER_NIBBLE);
        }
        if kind.is_anomaly(byte) {
            anomalies.push((i, byte));
        }
    }

    let text = match kind {
        GridKind::Sailing => String::new(),
        _ => nibbles
            .iter()
            .map(|&n| char::from_digit(u32::from(n), 16).unwrap_or('0'))
            .collect(),
    };

    CompressedGrid { text, anomalies }
}

/// Expand packed nibbles back into `cells` canonical bytes.
///
/// The Sailing overlay writes no nibbles, so an empty `text` means every
/// cell is sea there; the other kinds need the full nibble row. Features are
/// applied by the caller afterwards.
pub fn expand(
    kind: GridKind,
    region: &str,
    text: &str,
    cells: usize,
) -> Result<Vec<u8>, CodecError> {
    let mut out = vec![SEA; cells];
    if text.is_empty() && (kind == GridKind::Sailing || cells == 0) {
        return Ok(out);
    }
    if text.len() != GridKind::nibbles(cells) {
        return Err(CodecError::malformed(
            region,
            text,
            "nibble count does not match cell count",
        ));
    }
    for (j, c) in text.chars().enumerate() {
        let nibble = c
            .to_digit(16)
            .ok_or_else(|| CodecError::malformed(region, text, "invalid hex nibble"))?;
        for k in 0..CELLS_PER_NIBBLE {
            let i = j * CELLS_PER_NIBBLE + k;
            if nibble & (0b1000 >> k) == 0 {
                continue;
            }
            if i >= cells {
                return Err(CodecError::malformed(region, text, "land bit past the last cell"));
            }
            out[i] = kind.land_sentinel();
        }
    }
    Ok(out)
}
