//! Savegame unpacking: binary stream to pst text

use crate::annotate::{Annotator, NoAnnotations};
use crate::codec;
use crate::constants::{
    FEATURE_CODE, FEATURE_SEPARATOR, FIELD_SEPARATOR, MAX_TEXT_LEN, TEXT_PADDING,
};
use crate::context::RunContext;
use crate::error::CodecError;
use crate::grid;
use crate::layout::display_id;
use crate::resolver::{LeafSink, Resolver};
use crate::schema::{Schema, Section};
use crate::types::{FieldKind, Feature, LineCode, RegionId};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Seek, Write};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Counters reported at the end of an unpack run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackSummary {
    /// Field lines written
    pub lines: usize,
    /// Feature lines written
    pub features: usize,
    /// Bytes consumed from the savegame
    pub bytes_read: u64,
    /// Starting year captured at the sentinel, if any
    pub starting_year: Option<i32>,
}

/// Drives the resolver over a savegame and writes one pst line per leaf.
///
/// The reader's cursor is the only record of position. Each run owns a
/// fresh [`RunContext`].
pub struct Unpacker<'s, R, W, A = NoAnnotations> {
    schema: &'s Schema,
    reader: R,
    out: W,
    annotator: A,
    ctx: RunContext,
    features: Vec<Feature>,
    summary: UnpackSummary,
}

impl<'s, R: Read + Seek, W: Write> Unpacker<'s, R, W, NoAnnotations> {
    /// Unpacker with empty comment and translation columns
    pub fn new(schema: &'s Schema, reader: R, out: W) -> Self {
        Self::with_annotator(schema, reader, out, NoAnnotations)
    }
}

impl<'s, R: Read + Seek, W: Write, A: Annotator> Unpacker<'s, R, W, A> {
    /// Unpacker that fills the free-text columns from `annotator`
    pub fn with_annotator(schema: &'s Schema, reader: R, out: W, annotator: A) -> Self {
        Self {
            schema,
            reader,
            out,
            annotator,
            ctx: RunContext::new(),
            features: Vec::new(),
            summary: UnpackSummary::default(),
        }
    }

    /// Context of the current run
    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Number of top-level sections in the schema
    pub fn section_count(&self) -> usize {
        self.schema.sections().len()
    }

    /// Unpack one top-level section; sections must be fed in schema order
    pub fn unpack_section(&mut self, section: &Section) -> Result<(), CodecError> {
        Resolver::new(self.schema).walk_section(section, self)
    }

    /// Unpack every section, flush the output and report
    pub fn unpack_all(mut self) -> Result<UnpackSummary, CodecError> {
        let schema = self.schema;
        for section in schema.sections() {
            self.unpack_section(section)?;
        }
        self.finish()
    }

    /// Flush the output and report
    pub fn finish(mut self) -> Result<UnpackSummary, CodecError> {
        self.out.flush()?;
        let mut summary = self.summary;
        summary.bytes_read = self.reader.stream_position()?;
        summary.starting_year = self.ctx.starting_year();
        Ok(summary)
    }

    fn read_bytes(&mut self, region: &RegionId, n: usize) -> Result<Vec<u8>, CodecError> {
        let mut buf = vec![0u8; n];
        self.reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                CodecError::TruncatedStream {
                    region: region.to_string(),
                    needed: n,
                }
            } else {
                e.into()
            }
        })?;
        Ok(buf)
    }

    fn read_text(&mut self, region: &RegionId, padded: bool) -> Result<String, CodecError> {
        let prefix = self.read_bytes(region, 4)?;
        let length = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        if length > MAX_TEXT_LEN {
            return Err(CodecError::OversizedField {
                region: region.to_string(),
                length: length as u64,
                limit: MAX_TEXT_LEN,
            });
        }
        let bytes = self.read_bytes(region, length)?;
        if padded {
            let padding = self.read_bytes(region, TEXT_PADDING)?;
            if padding.iter().any(|&b| b != 0) {
                #[cfg(feature = "logging")]
                warn!("Non-zero padding after {} will be packed as zeros", region);
            }
        }
        Ok(codec::decode_text(&bytes))
    }

    fn write_field_line(
        &mut self,
        id: &str,
        code: LineCode,
        value: &str,
        lookup: &str,
    ) -> Result<(), CodecError> {
        let comment = self.annotator.comment(lookup, value, &self.ctx);
        let translation = self.annotator.translation(lookup, value, &self.ctx);
        writeln!(
            self.out,
            "{}   : {}{sep}{}{sep}{} {}",
            id,
            code,
            value,
            comment,
            translation,
            sep = FIELD_SEPARATOR
        )?;
        self.summary.lines += 1;
        Ok(())
    }

    fn flush_features(&mut self) -> Result<(), CodecError> {
        for feature in std::mem::take(&mut self.features) {
            let decimal = feature.value.to_string();
            let comment = self.annotator.comment(&feature.line_code, &decimal, &self.ctx);
            let translation = self.annotator.translation(&feature.line_code, &decimal, &self.ctx);
            writeln!(
                self.out,
                "{}   : {}   :  {:02x}{sep}{} {}",
                feature.line_code,
                FEATURE_CODE,
                feature.value,
                comment,
                translation,
                sep = FEATURE_SEPARATOR
            )?;
            self.summary.features += 1;
        }
        Ok(())
    }
}

impl<'s, R: Read + Seek, W: Write, A: Annotator> LeafSink for Unpacker<'s, R, W, A> {
    fn section_start(&mut self, section: &Section) -> Result<(), CodecError> {
        let position = self.reader.stream_position()?;

        #[cfg(feature = "logging")]
        debug!("{} starts at byte {}", section.name, position);

        writeln!(self.out, "## {} starts at byte {}", section.name, position)?;
        if let Some(banner) = &section.banner {
            writeln!(self.out, "# {}", banner)?;
        }
        Ok(())
    }

    fn leaf(&mut self, id: &RegionId, kind: FieldKind, width: usize) -> Result<(), CodecError> {
        let name = id.to_string();
        let value = match kind {
            FieldKind::Text => self.read_text(id, false)?,
            FieldKind::PaddedText => self.read_text(id, true)?,
            FieldKind::Grid(grid_kind) => {
                let cells = self.read_bytes(id, width)?;
                let compressed = grid::compress(grid_kind, &cells);
                self.features
                    .extend(compressed.anomalies.into_iter().map(|(i, value)| Feature {
                        line_code: format!("{}_{}", name, i),
                        value,
                    }));
                compressed.text
            }
            _ => {
                let bytes = self.read_bytes(id, width)?;
                codec::decode_fixed(&name, kind, &bytes)?
            }
        };

        self.write_field_line(
            &display_id(id, kind, width),
            LineCode::Field { kind, width },
            &value,
            &name,
        )?;

        if let Some(sentinel) = self.schema.sentinel() {
            if sentinel.region == *id {
                let jump = sentinel.jump;
                self.ctx.capture_starting_year(&mut self.reader, &name, jump)?;
            }
        }
        Ok(())
    }

    fn frame_end(&mut self, kind: FieldKind) -> Result<(), CodecError> {
        if kind.is_grid() {
            self.flush_features()?;
        }
        Ok(())
    }
}

/// Unpack a whole savegame held in memory into pst text
pub fn unpack_bytes(schema: &Schema, data: &[u8]) -> Result<(String, UnpackSummary), CodecError> {
    let mut text = Vec::new();
    let summary = Unpacker::new(schema, std::io::Cursor::new(data), &mut text).unpack_all()?;
    let text = String::from_utf8(text).map_err(|e| CodecError::Io(e.to_string()))?;
    Ok((text, summary))
}
