//! Layout resolver
//!
//! Walks a section of the schema, expanding regions under the uniform and
//! heterogeneous split rules until only leaves remain, and hands each leaf
//! to a [`LeafSink`]. The same walk drives unpacking, the static layout
//! listing and strict packing, so all three agree on region order.

use crate::error::CodecError;
use crate::schema::{Schema, Section};
use crate::types::{FieldKind, RegionId};
use alloc::string::ToString;

#[cfg(feature = "logging")]
use tracing::debug;

/// Receiver of the leaves produced by the resolver
pub trait LeafSink {
    /// Called once before each top-level section is walked
    fn section_start(&mut self, _section: &Section) -> Result<(), CodecError> {
        Ok(())
    }

    /// Called once per leaf instance, in stream order
    fn leaf(&mut self, id: &RegionId, kind: FieldKind, width: usize) -> Result<(), CodecError>;

    /// Called after every instance of a region frame has been walked
    fn frame_end(&mut self, _kind: FieldKind) -> Result<(), CodecError> {
        Ok(())
    }
}

/// One recursion frame: `count` instances of `name_<i>`
#[derive(Debug, Clone)]
struct Frame {
    name: RegionId,
    count: u32,
    width: usize,
    kind: FieldKind,
}

/// Expands schema regions into leaves
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'s> {
    schema: &'s Schema,
}

impl<'s> Resolver<'s> {
    /// Create a resolver over `schema`
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Walk every section in order
    pub fn walk<S: LeafSink>(&self, sink: &mut S) -> Result<(), CodecError> {
        for section in self.schema.sections() {
            self.walk_section(section, sink)?;
        }
        Ok(())
    }

    /// Walk a single top-level section
    pub fn walk_section<S: LeafSink>(
        &self,
        section: &Section,
        sink: &mut S,
    ) -> Result<(), CodecError> {
        #[cfg(feature = "logging")]
        debug!(
            "Resolving {} ({} x {} bytes, {:?})",
            section.name, section.count, section.width, section.kind
        );

        sink.section_start(section)?;
        let frame = Frame {
            name: RegionId::section(&section.name),
            count: section.count,
            width: section.width,
            kind: section.kind,
        };
        self.resolve(&frame, 0, sink)
    }

    fn resolve<S: LeafSink>(
        &self,
        frame: &Frame,
        offset: u32,
        sink: &mut S,
    ) -> Result<(), CodecError> {
        for c in offset..offset + frame.count {
            let id = frame.name.child(c);

            // Uniform split. Re-selecting the frame's own kind ends the recursion.
            if let Some(kind) = self.schema.uniform_rule(&id) {
                if kind != frame.kind {
                    let leaf_width = kind.default_width();
                    let children = uniform_children(&id, frame.width, leaf_width)?;
                    if children == 1 {
                        // Not a split, only a change of kind for this instance
                        let sub = Frame {
                            name: frame.name.clone(),
                            count: 1,
                            width: leaf_width,
                            kind,
                        };
                        self.resolve(&sub, c, sink)?;
                    } else {
                        let sub = Frame {
                            name: id,
                            count: children,
                            width: leaf_width,
                            kind,
                        };
                        self.resolve(&sub, 0, sink)?;
                    }
                    continue;
                }
            }

            // Heterogeneous split
            if let Some(parts) = self.schema.split_rule(&id) {
                let total: usize = parts.iter().map(|p| p.bytes()).sum();
                if total != frame.width {
                    return Err(CodecError::SubsectionSizeMismatch {
                        region: id.to_string(),
                        expected: frame.width,
                        actual: total,
                    });
                }
                let mut sub_offset = 0;
                for part in parts {
                    let sub = Frame {
                        name: id.clone(),
                        count: part.count,
                        width: part.width,
                        kind: part.kind,
                    };
                    self.resolve(&sub, sub_offset, sink)?;
                    sub_offset += part.count;
                }
                continue;
            }

            sink.leaf(&id, frame.kind, frame.width)?;
        }
        sink.frame_end(frame.kind)
    }
}

/// Number of `leaf_width` children a `width`-byte region splits into.
///
/// A zero leaf width (strings) never splits.
pub fn uniform_children(id: &RegionId, width: usize, leaf_width: usize) -> Result<u32, CodecError> {
    if leaf_width == 0 {
        return Ok(1);
    }
    if width % leaf_width != 0 {
        return Err(CodecError::NonDivisibleWidth {
            region: id.to_string(),
            width,
            leaf_width,
        });
    }
    Ok((width / leaf_width) as u32)
}
