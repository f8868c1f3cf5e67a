//! # pstkit core
//!
//! A schema-driven codec between Pirates! savegame files and the line
//! oriented pst text format.
//!
//! ## Modules
//!
//! - `constants`: Format constants and limits
//! - `types`: Field kinds, region identifiers and pst lines
//! - `schema`: Section table and split rules
//! - `resolver`: Expands schema regions into leaves
//! - `codec`: Per-field byte/text conversions
//! - `grid`: Terrain bit-grid compression
//! - `layout`: Static leaf plan of a schema
//! - `context`: Run-scoped state (starting year)
//! - `annotate`: Comment and translation hook
//! - `decoder`: Savegame to pst (requires `std`)
//! - `encoder`: Pst to savegame

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod annotate;
pub mod codec;
pub mod constants;
pub mod context;
#[cfg(feature = "std")]
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod grid;
pub mod layout;
pub mod resolver;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use annotate::{Annotator, NoAnnotations};
pub use context::RunContext;
#[cfg(feature = "std")]
pub use decoder::{unpack_bytes, UnpackSummary, Unpacker};
pub use encoder::{pack_str, pack_strict, PackSummary, Packer};
pub use error::CodecError;
pub use layout::{Layout, LeafPlan};
pub use schema::Schema;
pub use types::{FieldKind, GridKind, LineCode, PstLine, RegionId};

/// Result type alias for pstkit operations
pub type Result<T> = core::result::Result<T, CodecError>;
