//! Static leaf plan of a schema
//!
//! Walking the resolver without any data yields the ordered list of leaves
//! every pst file of that schema must contain. The walk also surfaces any
//! arithmetic error in the split rules.

use crate::constants::{TEXT_LEN_PREFIX, TEXT_PADDING};
use crate::error::CodecError;
use crate::resolver::{LeafSink, Resolver};
use crate::schema::Schema;
use crate::types::{FieldKind, LineCode, RegionId};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// One expected field line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafPlan {
    /// Identifier as printed (grids include their `_<width>` suffix)
    pub id: String,
    /// Code column, e.g. `V4`
    pub code: String,
    /// Field encoding
    pub kind: FieldKind,
    /// Declared width
    pub width: usize,
}

impl LeafPlan {
    /// Bytes this leaf occupies when every string is empty
    pub fn min_bytes(&self) -> usize {
        match self.kind {
            FieldKind::Text => TEXT_LEN_PREFIX,
            FieldKind::PaddedText => TEXT_LEN_PREFIX + TEXT_PADDING,
            _ => self.width,
        }
    }
}

/// Ordered leaf plan of a whole schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Leaves in stream order
    pub leaves: Vec<LeafPlan>,
}

impl Layout {
    /// Resolve every section of `schema` into its leaves
    pub fn of(schema: &Schema) -> Result<Self, CodecError> {
        let mut layout = Layout::default();
        Resolver::new(schema).walk(&mut layout)?;
        Ok(layout)
    }

    /// Length of a savegame whose strings are all empty
    pub fn min_stream_len(&self) -> usize {
        self.leaves.iter().map(LeafPlan::min_bytes).sum()
    }
}

impl LeafSink for Layout {
    fn leaf(&mut self, id: &RegionId, kind: FieldKind, width: usize) -> Result<(), CodecError> {
        self.leaves.push(LeafPlan {
            id: display_id(id, kind, width),
            code: LineCode::Field { kind, width }.to_string(),
            kind,
            width,
        });
        Ok(())
    }
}

/// Identifier printed for a leaf; grids carry their cell count
pub fn display_id(id: &RegionId, kind: FieldKind, width: usize) -> String {
    if kind.is_grid() {
        format!("{}_{}", id, width)
    } else {
        id.to_string()
    }
}
