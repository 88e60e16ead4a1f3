use crate::config::FlatAddressing;
use crate::error::{ConvertError, Result};
use crate::{align_to_section, BlockId, SECTION_BLOCKS, SECTION_EDGE};

/// Read access to a 3D grid of block ids, as consumed by the sectionizer.
pub trait VolumeSource {
    /// Block at `(x, y, z)`, or `None` when the cell lies outside the source.
    fn get(&self, x: usize, y: usize, z: usize) -> Option<BlockId>;

    fn extents(&self) -> (usize, usize, usize);

    /// True when every extent is a multiple of 16 and every cell inside the
    /// extents resolves to `Some`.
    fn is_padded(&self) -> bool {
        let (x, y, z) = self.extents();
        x % SECTION_EDGE == 0 && y % SECTION_EDGE == 0 && z % SECTION_EDGE == 0
    }
}

/// Rectangular in-memory volume, stored at `(x * size_y + y) * size_z + z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseVolume {
    size: (usize, usize, usize),
    blocks: Vec<BlockId>,
}

impl DenseVolume {
    pub fn filled(size: (usize, usize, usize), fill: BlockId) -> Self {
        DenseVolume {
            size,
            blocks: vec![fill; size.0 * size.1 * size.2],
        }
    }

    /// Build from `rows[x][y][z]`. Rejects empty and ragged input.
    pub fn from_nested(rows: &[Vec<Vec<BlockId>>]) -> Result<Self> {
        let size_x = rows.len();
        let size_y = rows.first().map_or(0, |row| row.len());
        let size_z = rows
            .first()
            .and_then(|row| row.first())
            .map_or(0, |col| col.len());
        if size_x == 0 || size_y == 0 || size_z == 0 {
            return Err(ConvertError::EmptyVolume);
        }

        let mut blocks = Vec::with_capacity(size_x * size_y * size_z);
        for (x, row) in rows.iter().enumerate() {
            if row.len() != size_y {
                return Err(ConvertError::RaggedVolume {
                    path: format!("/{}", x),
                    expected: size_y,
                    found: row.len(),
                });
            }
            for (y, col) in row.iter().enumerate() {
                if col.len() != size_z {
                    return Err(ConvertError::RaggedVolume {
                        path: format!("/{}/{}", x, y),
                        expected: size_z,
                        found: col.len(),
                    });
                }
                blocks.extend_from_slice(col);
            }
        }

        Ok(DenseVolume {
            size: (size_x, size_y, size_z),
            blocks,
        })
    }

    pub fn size(&self) -> (usize, usize, usize) {
        self.size
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let (sx, sy, sz) = self.size;
        (x < sx && y < sy && z < sz).then(|| (x * sy + y) * sz + z)
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) -> bool {
        match self.index(x, y, z) {
            Some(i) => {
                self.blocks[i] = block;
                true
            }
            None => false,
        }
    }

    /// Pad every axis up to a multiple of 16. Original cells keep their place at
    /// the origin corner; every new cell holds `padding_id`.
    pub fn normalize(&self, padding_id: BlockId) -> DenseVolume {
        let (sx, sy, sz) = self.size;
        let padded_size = (
            align_to_section(sx),
            align_to_section(sy),
            align_to_section(sz),
        );
        if padded_size == self.size {
            return self.clone();
        }

        let mut padded = DenseVolume::filled(padded_size, padding_id);
        let (_, py, pz) = padded_size;
        for x in 0..sx {
            for y in 0..sy {
                let src = (x * sy + y) * sz;
                let dst = (x * py + y) * pz;
                padded.blocks[dst..dst + sz].copy_from_slice(&self.blocks[src..src + sz]);
            }
        }
        padded
    }
}

impl VolumeSource for DenseVolume {
    fn get(&self, x: usize, y: usize, z: usize) -> Option<BlockId> {
        self.index(x, y, z).map(|i| self.blocks[i])
    }

    fn extents(&self) -> (usize, usize, usize) {
        self.size
    }
}

/// Flat buffer of resolved ids with a declared size, read through a
/// [`FlatAddressing`] policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatVolume {
    size: (usize, usize, usize),
    blocks: Vec<BlockId>,
    addressing: FlatAddressing,
}

impl FlatVolume {
    pub fn new(
        size: (usize, usize, usize),
        blocks: Vec<BlockId>,
        addressing: FlatAddressing,
    ) -> Self {
        FlatVolume {
            size,
            blocks,
            addressing,
        }
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn addressing(&self) -> FlatAddressing {
        self.addressing
    }

    fn windowed_offset(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let (sx, sy, sz) = self.size;
        if x >= align_to_section(sx) || y >= align_to_section(sy) || z >= align_to_section(sz) {
            return None;
        }
        let grid_y = sy.div_ceil(SECTION_EDGE);
        let grid_z = sz.div_ceil(SECTION_EDGE);
        let section = ((x / SECTION_EDGE) * grid_y + y / SECTION_EDGE) * grid_z + z / SECTION_EDGE;
        let local = ((x % SECTION_EDGE) * SECTION_EDGE + y % SECTION_EDGE) * SECTION_EDGE
            + z % SECTION_EDGE;
        Some(section * SECTION_BLOCKS + local)
    }

    fn spatial_offset(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let (sx, sy, sz) = self.size;
        (x < sx && y < sy && z < sz).then(|| (x * sy + y) * sz + z)
    }
}

impl VolumeSource for FlatVolume {
    fn get(&self, x: usize, y: usize, z: usize) -> Option<BlockId> {
        let offset = match self.addressing {
            FlatAddressing::Windowed => self.windowed_offset(x, y, z)?,
            FlatAddressing::Spatial => self.spatial_offset(x, y, z)?,
        };
        self.blocks.get(offset).copied()
    }

    fn extents(&self) -> (usize, usize, usize) {
        self.size
    }

    // Never padded: reads past the buffer are expected and filled by the caller.
    fn is_padded(&self) -> bool {
        false
    }
}
