use std::collections::BTreeMap;

use thiserror::Error;

use crate::bounding_box::BoundingBox;
use crate::utils::nbt::NbtMap;
use crate::BlockState;

/// A chunk column failed to load. Recoverable: scans treat it as "no
/// content for this chunk" wherever chunks are enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chunk ({cx}, {cz}) is not loaded in dimension '{dimension}'")]
pub struct ChunkLoadError {
    pub dimension: String,
    pub cx: i32,
    pub cz: i32,
}

/// The loaded content of one 16x16 chunk column: per-position block-entity
/// data and free-floating entities.
///
/// Block entities are keyed by absolute world position in an ordered map so
/// a scan's encounter order is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub block_entities: BTreeMap<(i32, i32, i32), NbtMap>,
    pub entities: Vec<NbtMap>,
}

/// Read access to a voxel world. The storage engine behind it is out of
/// scope; both operations block and may fail recoverably.
pub trait WorldSource {
    fn get_block(
        &self,
        dimension: &str,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<BlockState, ChunkLoadError>;

    fn get_chunk(&self, dimension: &str, cx: i32, cz: i32) -> Result<Chunk, ChunkLoadError>;
}

/// The scan scope: one or more axis-aligned boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    boxes: Vec<BoundingBox>,
}

impl Selection {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Selection { boxes }
    }

    pub fn single(bounds: BoundingBox) -> Self {
        Selection {
            boxes: vec![bounds],
        }
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn contains(&self, point: (i32, i32, i32)) -> bool {
        self.boxes.iter().any(|b| b.contains(point))
    }

    /// All chunk columns any box touches, deduplicated and sorted.
    pub fn chunk_locations(&self) -> Vec<(i32, i32)> {
        let mut locations: Vec<(i32, i32)> = self
            .boxes
            .iter()
            .flat_map(|b| b.chunk_locations())
            .collect();
        locations.sort_unstable();
        locations.dedup();
        locations
    }
}

impl From<BoundingBox> for Selection {
    fn from(bounds: BoundingBox) -> Self {
        Selection::single(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_membership() {
        let selection = Selection::new(vec![
            BoundingBox::new((0, 0, 0), (4, 4, 4)),
            BoundingBox::new((100, 0, 0), (104, 4, 4)),
        ]);

        assert!(selection.contains((0, 0, 0)));
        assert!(selection.contains((101, 1, 1)));
        assert!(!selection.contains((4, 0, 0)));
        assert!(!selection.contains((50, 0, 0)));
    }

    #[test]
    fn test_chunk_locations_dedup_overlapping_boxes() {
        let selection = Selection::new(vec![
            BoundingBox::new((0, 0, 0), (8, 4, 8)),
            BoundingBox::new((4, 0, 4), (12, 4, 12)),
        ]);
        assert_eq!(selection.chunk_locations(), vec![(0, 0)]);
    }
}
