//! Pst packing: text lines back to savegame bytes
//!
//! Packing is line driven. Every field line appends its encoded bytes in
//! file order; feature lines patch single cells of a grid row that was
//! emitted earlier. With a [`Layout`] attached, field lines are also checked
//! against the region order the schema expects.

use crate::codec;
use crate::constants::TEXT_PADDING;
use crate::error::CodecError;
use crate::grid;
use crate::layout::{LeafPlan, Layout};
use crate::schema::Schema;
use crate::types::{FieldKind, GridKind, LineCode, PstLine};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use bytes::{BufMut, Bytes, BytesMut};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::debug;

/// Counters reported at the end of a pack run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackSummary {
    /// Field lines encoded
    pub lines: usize,
    /// Feature lines applied
    pub features: usize,
    /// Bytes produced
    pub bytes_written: usize,
}

/// Where a grid row landed in the output
#[derive(Debug, Clone, Copy)]
struct GridSlot {
    offset: usize,
    cells: usize,
}

/// Incremental pst packer
#[derive(Debug, Default)]
pub struct Packer {
    buf: BytesMut,
    grids: HashMap<String, GridSlot>,
    expected: Option<Vec<LeafPlan>>,
    next_leaf: usize,
    last_line: usize,
    summary: PackSummary,
}

impl Packer {
    /// Packer that trusts the file's own ordering
    pub fn new() -> Self {
        Self::default()
    }

    /// Packer that rejects lines straying from `layout`
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            expected: Some(layout.leaves),
            ..Self::default()
        }
    }

    /// Bytes produced so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been produced yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Parse and apply one raw line. Blank and `#` lines are skipped.
    pub fn push_line(&mut self, line_no: usize, line: &str) -> Result<(), CodecError> {
        self.last_line = line_no;
        match PstLine::parse(line_no, line)? {
            Some(parsed) => self.push(line_no, &parsed),
            None => Ok(()),
        }
    }

    /// Apply one parsed line
    pub fn push(&mut self, line_no: usize, line: &PstLine) -> Result<(), CodecError> {
        match line.code {
            LineCode::Feature => self.patch_feature(line),
            LineCode::Field { kind, width } => {
                self.check_layout(line_no, line)?;
                self.encode_field(line, kind, width)?;
                self.summary.lines += 1;
                Ok(())
            }
        }
    }

    /// Finish the run and hand out the packed savegame
    pub fn finish(self) -> Result<(Bytes, PackSummary), CodecError> {
        if let Some(plan) = &self.expected {
            if let Some(missing) = plan.get(self.next_leaf) {
                return Err(CodecError::LayoutMismatch {
                    line: self.last_line + 1,
                    expected: missing.id.clone(),
                    found: "end of file".into(),
                });
            }
        }

        let mut summary = self.summary;
        summary.bytes_written = self.buf.len();

        #[cfg(feature = "logging")]
        debug!(
            "Packed {} lines and {} features into {} bytes",
            summary.lines, summary.features, summary.bytes_written
        );

        Ok((self.buf.freeze(), summary))
    }

    fn check_layout(&mut self, line_no: usize, line: &PstLine) -> Result<(), CodecError> {
        let Some(plan) = &self.expected else {
            return Ok(());
        };
        let found = format!("{} {}", line.id, line.code);
        match plan.get(self.next_leaf) {
            Some(leaf) if leaf.id == line.id && leaf.code == line.code.to_string() => {
                self.next_leaf += 1;
                Ok(())
            }
            Some(leaf) => Err(CodecError::LayoutMismatch {
                line: line_no,
                expected: format!("{} {}", leaf.id, leaf.code),
                found,
            }),
            None => Err(CodecError::LayoutMismatch {
                line: line_no,
                expected: "end of file".into(),
                found,
            }),
        }
    }

    fn encode_field(
        &mut self,
        line: &PstLine,
        kind: FieldKind,
        width: usize,
    ) -> Result<(), CodecError> {
        match kind {
            FieldKind::Text | FieldKind::PaddedText => {
                let bytes = codec::encode_text(&line.id, &line.value)?;
                self.buf.put_u32_le(bytes.len() as u32);
                self.buf.put_slice(&bytes);
                if kind == FieldKind::PaddedText {
                    self.buf.put_bytes(0, TEXT_PADDING);
                }
            }
            FieldKind::Grid(grid_kind) => self.encode_grid(line, grid_kind, width)?,
            _ => codec::encode_fixed(&line.id, kind, width, &line.value, &mut self.buf)?,
        }
        Ok(())
    }

    fn encode_grid(
        &mut self,
        line: &PstLine,
        kind: GridKind,
        width: usize,
    ) -> Result<(), CodecError> {
        // Grid ids carry their cell count as a last suffix
        let region = match line.id.rsplit_once('_') {
            Some((region, cells)) if cells == width.to_string() => region,
            _ => {
                return Err(CodecError::malformed(
                    &line.id,
                    &line.value,
                    "grid identifier must end with its cell count",
                ))
            }
        };
        let cells = grid::expand(kind, region, &line.value, width)?;
        self.grids.insert(
            region.to_string(),
            GridSlot {
                offset: self.buf.len(),
                cells: width,
            },
        );
        self.buf.put_slice(&cells);
        Ok(())
    }

    fn patch_feature(&mut self, line: &PstLine) -> Result<(), CodecError> {
        let bad = |reason: &str| CodecError::malformed(&line.id, &line.value, reason);
        let (region, index) = line
            .id
            .rsplit_once('_')
            .ok_or_else(|| bad("feature identifier has no cell index"))?;
        let index: usize = index.parse().map_err(|_| bad("cell index is not a number"))?;
        if line.value.is_empty()
            || line.value.len() > 2
            || !line.value.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(bad("feature value must be one hex byte"));
        }
        let value = u8::from_str_radix(&line.value, 16).map_err(|_| bad("invalid hex byte"))?;

        let slot = *self
            .grids
            .get(region)
            .ok_or_else(|| bad("feature refers to no preceding grid"))?;
        if index >= slot.cells {
            return Err(bad("cell index outside the grid"));
        }
        self.buf[slot.offset + index] = value;
        self.summary.features += 1;
        Ok(())
    }
}

/// Pack a whole pst document
pub fn pack_str(text: &str) -> Result<(Bytes, PackSummary), CodecError> {
    pack_with(Packer::new(), text)
}

/// Pack a whole pst document, requiring its field lines to follow `schema`
pub fn pack_strict(text: &str, schema: &Schema) -> Result<(Bytes, PackSummary), CodecError> {
    pack_with(Packer::with_layout(Layout::of(schema)?), text)
}

fn pack_with(mut packer: Packer, text: &str) -> Result<(Bytes, PackSummary), CodecError> {
    for (i, line) in text.lines().enumerate() {
        packer.push_line(i + 1, line)?;
    }
    packer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(text: &str) -> Vec<u8> {
        pack_str(text).unwrap().0.to_vec()
    }

    #[test]
    fn test_field_lines_append_in_order() {
        let bytes = pack(
            "## A starts at byte 0\n\
             A_0   : V4   :   4294967295   :   \n\
             A_1   : s2   :   -2   :   \n\
             A_2   : h4   :   0A.0B.0C.0D   :   \n\
             A_3   : x3   :   zero_string   :   \n",
        );
        assert_eq!(
            bytes,
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0x0D, 0x0C, 0x0B, 0x0A, 0, 0, 0]
        );
    }

    #[test]
    fn test_text_lines() {
        let bytes = pack("N_0   : t8   :   Ab   :   \nI_0   : t0   :      :   \n");
        let mut expected = 2u32.to_le_bytes().to_vec();
        expected.extend_from_slice(b"Ab");
        expected.extend_from_slice(&[0; 8]);
        expected.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_text_keeps_inner_spaces() {
        let bytes = pack("I_0   : t0   :    two  words    :   \n");
        assert_eq!(&bytes[4..], b" two  words ");
    }

    #[test]
    fn test_features_patch_grid_cells() {
        let bytes = pack(
            "M_0_5   : M5   :   a8   :   \n\
             M_1_5   : M5   :   10   :   \n\
             M_0_2   : F1   :  42  :   \n\
             M_1_3   : F1   :  07  :   \n",
        );
        assert_eq!(bytes, vec![0xFF, 0, 0x42, 0, 0xFF, 0, 0, 0, 0x07, 0]);
    }

    #[test]
    fn test_sailing_grid_is_sea_plus_features() {
        let bytes = pack("S_0_4   : m4   :      :    \nS_0_1   : F1   :  20  :   \n");
        assert_eq!(bytes, vec![0, 0x20, 0, 0]);
    }

    #[test]
    fn test_land_grid_needs_nibbles() {
        let err = pack_str("M_0_8   : M8   :      :   \n").unwrap_err();
        assert!(matches!(err, CodecError::MalformedValue { .. }));
        let err = pack_str("C_0_8   : MM8   :      :   \n").unwrap_err();
        assert!(matches!(err, CodecError::MalformedValue { .. }));
    }

    #[test]
    fn test_feature_without_grid_fails() {
        let err = pack_str("M_0_2   : F1   :  42  :   \n").unwrap_err();
        assert!(matches!(err, CodecError::MalformedValue { .. }));
    }

    #[test]
    fn test_feature_out_of_range_fails() {
        let err =
            pack_str("M_0_4   : M4   :   0   :   \nM_0_4   : F1   :  42  :   \n").unwrap_err();
        assert!(matches!(err, CodecError::MalformedValue { .. }));
    }

    #[test]
    fn test_grid_suffix_must_match_width() {
        let err = pack_str("M_0_5   : M4   :   0   :   \n").unwrap_err();
        assert!(matches!(err, CodecError::MalformedValue { .. }));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = pack_str("# header\nA_0   : V4   :   1   :\nbroken\n").unwrap_err();
        assert!(matches!(err, CodecError::MalformedLine { line: 3, .. }));
    }

    #[test]
    fn test_strict_packing_checks_order() {
        let schema = Schema::builder()
            .section("A", 2, 4, FieldKind::Int)
            .build()
            .unwrap();

        let two_lines = "A_0   : V4   :   1   :\nA_1   : V4   :   2   :\n";
        let (bytes, summary) = pack_strict(two_lines, &schema).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(summary.lines, 2);

        let err = pack_strict("A_1   : V4   :   1   :\n", &schema).unwrap_err();
        assert_eq!(
            err,
            CodecError::LayoutMismatch {
                line: 1,
                expected: "A_0 V4".into(),
                found: "A_1 V4".into()
            }
        );

        let err = pack_strict("A_0   : V4   :   1   :\n", &schema).unwrap_err();
        assert!(matches!(err, CodecError::LayoutMismatch { line: 2, .. }));

        let three_lines = format!("{}A_2   : V4   :   3   :\n", two_lines);
        let err = pack_strict(&three_lines, &schema).unwrap_err();
        assert!(matches!(err, CodecError::LayoutMismatch { line: 3, .. }));
    }

    #[test]
    fn test_summary_counts() {
        let (_, summary) = pack_str("M_0_4   : M4   :   8   :\nM_0_1   : F1   :  03  :\n").unwrap();
        assert_eq!(
            summary,
            PackSummary {
                lines: 1,
                features: 1,
                bytes_written: 4
            }
        );
    }
}
