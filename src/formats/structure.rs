use crate::config::FlatAddressing;
use crate::error::{ConvertError, Result};
use crate::formats::manager::{ImportContext, VolumeImporter};
use crate::palette::{resolve, validate_indices, BlockDictionary, Palette};
use crate::schema::structure_schema;
use crate::volume::{FlatVolume, VolumeSource};
use crate::BlockId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use tracing::info;

/// A paletted structure document:
/// `{ size, structure: { block_indices, palette: { default: { block_palette } } } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureDocument {
    pub size: [u32; 3],
    pub structure: StructureBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureBody {
    /// Only the first layer is used.
    pub block_indices: Vec<Vec<i64>>,
    pub palette: PaletteSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteSet {
    pub default: PaletteGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteGroup {
    pub block_palette: Vec<PaletteEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: SmolStr,
}

impl StructureDocument {
    /// Validate against the structure schema, then decode.
    pub fn from_value(document: &Value) -> Result<Self> {
        structure_schema()
            .validate(document)
            .map_err(|violation| ConvertError::Schema {
                document: "input file",
                violation,
            })?;
        Ok(StructureDocument::deserialize(document)?)
    }

    pub fn indices(&self) -> &[i64] {
        self.structure
            .block_indices
            .first()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn palette(&self) -> Palette {
        self.structure
            .palette
            .default
            .block_palette
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn volume_size(&self) -> (usize, usize, usize) {
        let [x, y, z] = self.size;
        (x as usize, y as usize, z as usize)
    }

    /// Check counts, resolve names and wrap the flat buffer.
    pub fn resolve(
        &self,
        dictionary: &BlockDictionary,
        default_id: BlockId,
        addressing: FlatAddressing,
    ) -> Result<FlatVolume> {
        let palette = self.palette();
        validate_indices(self.size, self.indices(), &palette)?;
        let blocks = resolve(self.indices(), &palette, dictionary, default_id)?;
        info!(
            "Resolved structure {:?}: {} blocks, {} palette entries",
            self.size,
            blocks.len(),
            palette.len()
        );
        Ok(FlatVolume::new(self.volume_size(), blocks, addressing))
    }
}

pub struct StructureFormat;

impl VolumeImporter for StructureFormat {
    fn name(&self) -> String {
        "structure".to_string()
    }

    fn detect(&self, document: &Value) -> bool {
        document
            .as_object()
            .is_some_and(|obj| obj.contains_key("size") && obj.contains_key("structure"))
    }

    fn import(
        &self,
        document: &Value,
        context: &ImportContext<'_>,
    ) -> Result<Box<dyn VolumeSource>> {
        let dictionary = context
            .dictionary
            .ok_or(ConvertError::MissingDictionary("structure"))?;
        let structure = StructureDocument::from_value(document)?;
        let volume = structure.resolve(
            dictionary,
            context.options.default_id,
            context.options.addressing,
        )?;
        Ok(Box::new(volume))
    }
}
