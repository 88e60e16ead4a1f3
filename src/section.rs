use crate::volume::VolumeSource;
use crate::{BlockId, SECTION_BLOCKS, SECTION_EDGE};
use tracing::{debug, info};

/// A 16×16×16 cube of block ids at a 16-aligned origin.
///
/// `blocks` always holds [`SECTION_BLOCKS`] entries; local cell `(x, y, z)` is at
/// `(x * 16 + y) * 16 + z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub blocks: Vec<BlockId>,
}

impl Section {
    #[inline(always)]
    pub fn local_index(x: usize, y: usize, z: usize) -> usize {
        (x * SECTION_EDGE + y) * SECTION_EDGE + z
    }

    pub fn filled(origin: (i32, i32, i32), block: BlockId) -> Self {
        Section {
            x: origin.0,
            y: origin.1,
            z: origin.2,
            blocks: vec![block; SECTION_BLOCKS],
        }
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<BlockId> {
        if x >= SECTION_EDGE || y >= SECTION_EDGE || z >= SECTION_EDGE {
            return None;
        }
        self.blocks.get(Self::local_index(x, y, z)).copied()
    }

    /// `blocks[x][y][z]` view of the section.
    pub fn to_nested(&self) -> Vec<Vec<Vec<BlockId>>> {
        self.blocks
            .chunks(SECTION_EDGE * SECTION_EDGE)
            .map(|plane| plane.chunks(SECTION_EDGE).map(<[BlockId]>::to_vec).collect())
            .collect()
    }
}

/// Number of sections along each axis needed to cover `extents`.
pub fn section_grid(extents: (usize, usize, usize)) -> (usize, usize, usize) {
    (
        extents.0.div_ceil(SECTION_EDGE),
        extents.1.div_ceil(SECTION_EDGE),
        extents.2.div_ceil(SECTION_EDGE),
    )
}

/// Partition `source` into sections, emitted in x, then y, then z grid order.
///
/// Cells the source does not cover are set to `out_of_range_id`. For padded
/// sources every cell is covered and the grid divides the extents exactly.
pub fn sectionize<S: VolumeSource + ?Sized>(source: &S, out_of_range_id: BlockId) -> Vec<Section> {
    let extents = source.extents();
    let padded = source.is_padded();
    if padded {
        debug_assert!(
            extents.0 % SECTION_EDGE == 0
                && extents.1 % SECTION_EDGE == 0
                && extents.2 % SECTION_EDGE == 0,
            "padded source with unaligned extents {:?}",
            extents
        );
    }

    let (grid_x, grid_y, grid_z) = section_grid(extents);
    info!(
        "Sectionizing {:?} volume into {}x{}x{} sections",
        extents, grid_x, grid_y, grid_z
    );

    let mut sections = Vec::with_capacity(grid_x * grid_y * grid_z);
    for gx in 0..grid_x {
        for gy in 0..grid_y {
            let ox = gx * SECTION_EDGE;
            let oy = gy * SECTION_EDGE;
            debug!("Reading column at ({}, {}, *)", ox, oy);
            for gz in 0..grid_z {
                let oz = gz * SECTION_EDGE;
                debug!("Creating section at ({}, {}, {})", ox, oy, oz);

                let mut blocks = Vec::with_capacity(SECTION_BLOCKS);
                for lx in 0..SECTION_EDGE {
                    for ly in 0..SECTION_EDGE {
                        for lz in 0..SECTION_EDGE {
                            let block = source.get(ox + lx, oy + ly, oz + lz);
                            debug_assert!(!padded || block.is_some());
                            blocks.push(block.unwrap_or(out_of_range_id));
                        }
                    }
                }

                sections.push(Section {
                    x: ox as i32,
                    y: oy as i32,
                    z: oz as i32,
                    blocks,
                });
            }
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlatAddressing;
    use crate::volume::{DenseVolume, FlatVolume};
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Clone, Default)]
    struct DebugLines(Arc<Mutex<Vec<String>>>);

    struct MessageVisitor<'a>(&'a mut String);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for DebugLines {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::DEBUG {
                let mut message = String::new();
                event.record(&mut MessageVisitor(&mut message));
                self.0.lock().unwrap().push(message);
            }
        }
    }

    fn gradient(size: (usize, usize, usize)) -> DenseVolume {
        let mut volume = DenseVolume::filled(size, 0);
        for x in 0..size.0 {
            for y in 0..size.1 {
                for z in 0..size.2 {
                    volume.set(x, y, z, (x * 10_000 + y * 100 + z) as BlockId);
                }
            }
        }
        volume
    }

    #[test]
    fn test_local_index() {
        assert_eq!(Section::local_index(0, 0, 1), 1);
        assert_eq!(Section::local_index(0, 1, 0), 16);
        assert_eq!(Section::local_index(1, 0, 0), 256);
        assert_eq!(Section::local_index(15, 15, 15), SECTION_BLOCKS - 1);
    }

    #[test]
    fn test_section_grid() {
        assert_eq!(section_grid((16, 16, 16)), (1, 1, 1));
        assert_eq!(section_grid((17, 1, 32)), (2, 1, 2));
        assert_eq!(section_grid((2, 2, 2)), (1, 1, 1));
    }

    #[test]
    fn test_sectionize_padded_counts_and_order() {
        let volume = gradient((32, 16, 48));
        let sections = sectionize(&volume, -1);
        assert_eq!(sections.len(), 6);
        let origins: Vec<(i32, i32, i32)> = sections.iter().map(|s| (s.x, s.y, s.z)).collect();
        assert_eq!(
            origins,
            vec![
                (0, 0, 0),
                (0, 0, 16),
                (0, 0, 32),
                (16, 0, 0),
                (16, 0, 16),
                (16, 0, 32),
            ]
        );
        assert!(sections.iter().all(|s| s.blocks.len() == SECTION_BLOCKS));
    }

    #[test]
    fn test_sectionize_reconstructs_volume() {
        let volume = gradient((32, 32, 16));
        let sections = sectionize(&volume, -1);
        let mut rebuilt = DenseVolume::filled((32, 32, 16), i32::MIN);
        for section in &sections {
            for lx in 0..16 {
                for ly in 0..16 {
                    for lz in 0..16 {
                        let (x, y, z) = (
                            section.x as usize + lx,
                            section.y as usize + ly,
                            section.z as usize + lz,
                        );
                        // Each cell is written exactly once.
                        assert_eq!(rebuilt.get(x, y, z), Some(i32::MIN));
                        rebuilt.set(x, y, z, section.get(lx, ly, lz).unwrap());
                    }
                }
            }
        }
        assert_eq!(rebuilt, volume);
    }

    #[test]
    fn test_sectionize_unpadded_fills_out_of_range() {
        let volume = gradient((2, 1, 1));
        let sections = sectionize(&volume, -7);
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.get(0, 0, 0), Some(0));
        assert_eq!(section.get(1, 0, 0), Some(10_000));
        assert_eq!(section.get(0, 0, 1), Some(-7));
        assert_eq!(section.blocks.iter().filter(|&&b| b == -7).count(), SECTION_BLOCKS - 2);
    }

    #[test]
    fn test_sectionize_flat_windowed() {
        let flat = FlatVolume::new(
            (2, 2, 2),
            vec![1, 3, 1, 3, 1, 3, 1, 3],
            FlatAddressing::Windowed,
        );
        let sections = sectionize(&flat, -1);
        assert_eq!(sections.len(), 1);
        let blocks = &sections[0].blocks;
        assert_eq!(&blocks[..8], &[1, 3, 1, 3, 1, 3, 1, 3]);
        assert!(blocks[8..].iter().all(|&b| b == -1));
    }

    #[test]
    fn test_sectionize_flat_spatial() {
        let flat = FlatVolume::new((2, 2, 2), (0..8).collect(), FlatAddressing::Spatial);
        let sections = sectionize(&flat, -1);
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.get(0, 0, 1), Some(1));
        assert_eq!(section.get(0, 1, 0), Some(2));
        assert_eq!(section.get(1, 1, 1), Some(7));
        assert_eq!(section.get(0, 0, 2), Some(-1));
        assert_eq!(section.blocks.iter().filter(|&&b| b >= 0).count(), 8);
    }

    #[test]
    fn test_to_nested() {
        let mut section = Section::filled((0, 16, 0), 0);
        section.blocks[Section::local_index(3, 4, 5)] = 9;
        let nested = section.to_nested();
        assert_eq!(nested.len(), 16);
        assert!(nested
            .iter()
            .all(|plane| plane.len() == 16 && plane.iter().all(|row| row.len() == 16)));
        assert_eq!(nested[3][4][5], 9);
        assert_eq!(nested[5][4][3], 0);
    }

    #[test]
    fn test_sectionize_logs_columns_then_sections() {
        let lines = DebugLines::default();
        let subscriber = tracing_subscriber::registry().with(lines.clone());
        let volume = gradient((32, 16, 32));
        tracing::subscriber::with_default(subscriber, || sectionize(&volume, -1));

        let lines = lines.0.lock().unwrap();
        assert_eq!(
            *lines,
            vec![
                "Reading column at (0, 0, *)",
                "Creating section at (0, 0, 0)",
                "Creating section at (0, 0, 16)",
                "Reading column at (16, 0, *)",
                "Creating section at (16, 0, 0)",
                "Creating section at (16, 0, 16)",
            ]
        );
    }
}
