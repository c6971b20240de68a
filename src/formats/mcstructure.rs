//! Chunked-container (`.mcstructure`) export.
//!
//! The container file itself is produced by an external encoder; this
//! module owns the seam and the chunk streaming loop.

use std::path::Path;

use log::debug;

use crate::bounding_box::BoundingBox;
use crate::export::ExportError;
use crate::world::{Chunk, Selection, WorldSource};

/// An open encoder session for one output file. Dropped after
/// [`finalize`](ChunkContainerEncoder::finalize); release of any underlying
/// resources happens on drop.
pub trait ChunkContainerEncoder {
    fn commit_chunk(&mut self, cx: i32, cz: i32, chunk: &Chunk) -> Result<(), ExportError>;
    fn finalize(&mut self) -> Result<(), ExportError>;
}

/// Factory for encoder sessions, configured per file with the target
/// platform version, the region being written, and whether entities ride
/// along.
pub trait ChunkContainerFormat {
    fn open(
        &self,
        path: &Path,
        version: (i32, i32, i32),
        bounds: &BoundingBox,
        include_entities: bool,
    ) -> Result<Box<dyn ChunkContainerEncoder>, ExportError>;
}

/// Stream every chunk intersecting `bounds` through a fresh encoder
/// session. Chunks that fail to load are skipped; block-entity content
/// attached to committed chunks always rides along (the remove-blocks
/// toggle does not apply to this path).
pub fn export_container(
    world: &dyn WorldSource,
    dimension: &str,
    bounds: &BoundingBox,
    path: &Path,
    version: (i32, i32, i32),
    include_entities: bool,
    container: &dyn ChunkContainerFormat,
) -> Result<(), ExportError> {
    debug!(
        "container export to {:?}, platform version {}.{}.{}",
        path, version.0, version.1, version.2
    );

    let mut encoder = container.open(path, version, bounds, include_entities)?;

    for (cx, cz) in Selection::single(*bounds).chunk_locations() {
        let chunk = match world.get_chunk(dimension, cx, cz) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("skipping chunk during container export: {}", e);
                continue;
            }
        };
        encoder.commit_chunk(cx, cz, &chunk)?;
    }

    encoder.finalize()
}
