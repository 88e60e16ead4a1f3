//! Converts voxel documents into sectioned level data.
//!
//! Two input encodings are supported:
//!
//! * a dense `[[[id]]]` array, padded to a 16-aligned grid before sectioning;
//! * a paletted structure document, whose palette names are resolved through a
//!   block dictionary into a flat id buffer.
//!
//! Both feed a single [`section::sectionize`] through the [`volume::VolumeSource`]
//! trait and end up in a [`level::LevelData`] envelope.
//!
//! ```ignore
//! use level_exporter::{convert, ConvertOptions};
//!
//! let data = std::fs::read("region.json")?;
//! let level = convert::convert_dense(&data, &ConvertOptions::default())?;
//! std::fs::write("region.level.json", level.to_json(ConvertOptions::default().layout)?)?;
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod level;
pub mod palette;
pub mod schema;
pub mod section;
pub mod volume;

pub use config::{BlockLayout, ConvertOptions, FlatAddressing};
pub use error::{ConvertError, ErrorKind, Result};
pub use level::LevelData;
pub use palette::{BlockDictionary, Palette};
pub use section::Section;
pub use volume::{DenseVolume, FlatVolume, VolumeSource};

/// Global block id as consumed by the target runtime.
pub type BlockId = i32;

/// Edge length of a section.
pub const SECTION_EDGE: usize = 16;

/// Cells in a section.
pub const SECTION_BLOCKS: usize = SECTION_EDGE * SECTION_EDGE * SECTION_EDGE;

/// Round `n` up to the next multiple of [`SECTION_EDGE`].
pub fn align_to_section(n: usize) -> usize {
    n.div_ceil(SECTION_EDGE) * SECTION_EDGE
}
