use crate::error::{ConvertError, Result};
use crate::schema::block_dictionary_schema;
use crate::BlockId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use smol_str::SmolStr;
use tracing::{debug, warn};

/// Ordered block names; position is the key used by the flat index buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    names: Vec<SmolStr>,
}

impl Palette {
    pub fn new(names: Vec<SmolStr>) -> Self {
        Palette { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(SmolStr::as_str)
    }

    pub fn names(&self) -> &[SmolStr] {
        &self.names
    }
}

impl<S: Into<SmolStr>> FromIterator<S> for Palette {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Palette::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Block name to global id, e.g. `minecraft:stone -> 1`.
#[derive(Debug, Clone, Default)]
pub struct BlockDictionary {
    ids: FxHashMap<SmolStr, BlockId>,
}

impl BlockDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and decode a dictionary document.
    pub fn from_value(value: &Value) -> Result<Self> {
        block_dictionary_schema()
            .validate(value)
            .map_err(|violation| ConvertError::Schema {
                document: "block dictionary",
                violation,
            })?;
        let raw: FxHashMap<SmolStr, i64> = serde_json::from_value(value.clone())?;

        let mut ids = FxHashMap::default();
        ids.reserve(raw.len());
        for (name, id) in raw {
            let id = BlockId::try_from(id).map_err(|_| ConvertError::BlockIdOutOfRange {
                path: format!("/{}", name),
                value: id,
            })?;
            ids.insert(name, id);
        }
        Ok(BlockDictionary { ids })
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(data)?;
        Self::from_value(&value)
    }

    pub fn insert(&mut self, name: impl Into<SmolStr>, id: BlockId) {
        self.ids.insert(name.into(), id);
    }

    pub fn get(&self, name: &str) -> Option<BlockId> {
        self.ids.get(name).copied()
    }

    /// Unknown names fall back to `default`; never an error.
    pub fn get_or(&self, name: &str, default: BlockId) -> BlockId {
        self.get(name).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<SmolStr>> FromIterator<(S, BlockId)> for BlockDictionary {
    fn from_iter<I: IntoIterator<Item = (S, BlockId)>>(iter: I) -> Self {
        BlockDictionary {
            ids: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Check the flat index buffer against its declared size and palette.
///
/// The palette must cover exactly `max(indices) + 1` entries; negative indices
/// are rejected.
pub fn validate_indices(size: [u32; 3], indices: &[i64], palette: &Palette) -> Result<()> {
    let expected = size
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n as usize))
        .unwrap_or(usize::MAX);
    if indices.len() != expected {
        return Err(ConvertError::IndexCountMismatch {
            size,
            expected,
            found: indices.len(),
        });
    }

    if let Some((position, &index)) = indices.iter().enumerate().find(|&(_, &i)| i < 0) {
        return Err(ConvertError::PaletteIndexOutOfRange { position, index });
    }

    let max = indices.iter().copied().max().unwrap_or(0) as usize;
    if palette.len() != max + 1 {
        return Err(ConvertError::PaletteSizeMismatch {
            expected: max + 1,
            found: palette.len(),
        });
    }
    Ok(())
}

/// Map each palette index to a global id. Output has the same length and
/// order as `indices`.
pub fn resolve(
    indices: &[i64],
    palette: &Palette,
    dictionary: &BlockDictionary,
    default_id: BlockId,
) -> Result<Vec<BlockId>> {
    let mut unknown: FxHashSet<&str> = FxHashSet::default();
    let lookup: Vec<BlockId> = palette
        .names()
        .iter()
        .map(|name| {
            dictionary.get(name).unwrap_or_else(|| {
                if unknown.insert(name.as_str()) {
                    warn!("Unknown block '{}', using default id {}", name, default_id);
                }
                default_id
            })
        })
        .collect();
    debug!(
        "Resolved palette of {} entries ({} unknown)",
        lookup.len(),
        unknown.len()
    );

    indices
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            usize::try_from(index)
                .ok()
                .and_then(|i| lookup.get(i).copied())
                .ok_or_else(|| ConvertError::PaletteIndexOutOfRange { position, index })
        })
        .collect()
}
