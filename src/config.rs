use crate::error::Result;
use crate::BlockId;
use serde::{Deserialize, Serialize};

/// Shape of the `blocks` field of each emitted section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockLayout {
    /// 4096 ids, index `(x * 16 + y) * 16 + z`.
    #[default]
    Flat,
    /// `blocks[x][y][z]`, 16 × 16 × 16.
    Nested,
}

/// How a flat resolved buffer maps onto section cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatAddressing {
    /// Section `s` (in x, y, z grid order) reads buffer offsets `s * 4096 ..`.
    /// Cells only land at their geometric position when the buffer was written
    /// section by section; use `Spatial` for plain row-major buffers.
    #[default]
    Windowed,
    /// Buffer is a row-major volume, `index = (x * size_y + y) * size_z + z`.
    Spatial,
}

/// Conversion settings. Every sentinel is a value here, not a literal in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Fill for cells introduced when a dense volume is padded to 16.
    #[serde(default = "default_sentinel")]
    pub padding_id: BlockId,
    /// Fill for cells a section reads past the end of its source.
    #[serde(default = "default_sentinel")]
    pub out_of_range_id: BlockId,
    /// Id used for palette names missing from the block dictionary.
    #[serde(default)]
    pub default_id: BlockId,
    #[serde(default)]
    pub layout: BlockLayout,
    #[serde(default)]
    pub addressing: FlatAddressing,
}

fn default_sentinel() -> BlockId {
    -1
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            padding_id: default_sentinel(),
            out_of_range_id: default_sentinel(),
            default_id: 0,
            layout: BlockLayout::default(),
            addressing: FlatAddressing::default(),
        }
    }
}

impl ConvertOptions {
    /// Parse a settings document; absent fields keep their defaults.
    pub fn from_json(settings: &str) -> Result<Self> {
        Ok(serde_json::from_str(settings)?)
    }

    pub fn with_layout(mut self, layout: BlockLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_addressing(mut self, addressing: FlatAddressing) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn settings_schema() -> Option<String> {
        serde_json::to_string_pretty(&ConvertOptions::default()).ok()
    }
}
