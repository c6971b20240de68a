//! Self-contained tree export: scans a target box into a
//! [`StructureDocument`].

use std::collections::BTreeMap;

use log::debug;

use crate::bounding_box::BoundingBox;
use crate::document::{BlockEntry, EntityEntry, StructureDocument};
use crate::export::ExportError;
use crate::utils::nbt::NbtMap;
use crate::world::{Selection, WorldSource};

/// Knobs for the box scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Skip every voxel, emitting a size-only placeholder document.
    pub remove_blocks: bool,
    /// Include free-floating entities contained in the box.
    pub include_entities: bool,
}

/// Scan `bounds` into a document.
///
/// The voxel order is Y-major, then Z, then X. That order is part of the
/// serialization contract and must not change: it is what makes two exports
/// of the same box byte-identical.
pub fn build_document(
    world: &dyn WorldSource,
    dimension: &str,
    bounds: &BoundingBox,
    options: ScanOptions,
) -> Result<StructureDocument, ExportError> {
    let mut document = StructureDocument::new(bounds.size());

    let mut block_entities = collect_block_entities(world, dimension, bounds);

    if !options.remove_blocks {
        for y in bounds.min.1..bounds.max.1 {
            for z in bounds.min.2..bounds.max.2 {
                for x in bounds.min.0..bounds.max.0 {
                    let state = world.get_block(dimension, x, y, z)?;
                    if state.is_air() {
                        continue;
                    }

                    let index = document.palette.get_or_add(&state);
                    let nbt = block_entities.remove(&(x, y, z)).map(strip_position_keys);

                    document.blocks.push(BlockEntry {
                        pos: bounds.relative((x, y, z)),
                        state: index,
                        nbt,
                    });
                }
            }
        }
    }

    if options.include_entities {
        collect_entities(world, dimension, bounds, &mut document);
    }

    debug!(
        "scanned box {:?}..{:?}: {} palette entries, {} blocks, {} entities",
        bounds.min,
        bounds.max,
        document.palette.len(),
        document.blocks.len(),
        document.entities.len()
    );

    Ok(document)
}

/// Gather block-entity data for every position inside the box, keyed by
/// absolute position. Chunks that fail to load contribute nothing.
fn collect_block_entities(
    world: &dyn WorldSource,
    dimension: &str,
    bounds: &BoundingBox,
) -> BTreeMap<(i32, i32, i32), NbtMap> {
    let mut out = BTreeMap::new();
    for (cx, cz) in Selection::single(*bounds).chunk_locations() {
        let chunk = match world.get_chunk(dimension, cx, cz) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("skipping chunk during block-entity collection: {}", e);
                continue;
            }
        };
        for (&position, data) in &chunk.block_entities {
            if bounds.contains(position) {
                out.insert(position, data.clone());
            }
        }
    }
    out
}

/// The relative block position already encodes where the data belongs.
fn strip_position_keys(mut nbt: NbtMap) -> NbtMap {
    nbt.remove("x");
    nbt.remove("y");
    nbt.remove("z");
    nbt
}

fn collect_entities(
    world: &dyn WorldSource,
    dimension: &str,
    bounds: &BoundingBox,
    document: &mut StructureDocument,
) {
    for (cx, cz) in Selection::single(*bounds).chunk_locations() {
        let chunk = match world.get_chunk(dimension, cx, cz) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("skipping chunk during entity collection: {}", e);
                continue;
            }
        };

        for data in &chunk.entities {
            let Some(position) = entity_position(data) else {
                continue;
            };
            if !bounds.contains_f64(position) {
                continue;
            }

            // The block anchor floors the absolute position, not the
            // relative one; the two agree because box corners are integral.
            let block_pos = (
                position.0.floor() as i32 - bounds.min.0,
                position.1.floor() as i32 - bounds.min.1,
                position.2.floor() as i32 - bounds.min.2,
            );

            document.entities.push(EntityEntry {
                pos: bounds.relative_f64(position),
                block_pos,
                nbt: data.clone(),
            });
        }
    }
}

/// A 3-double `Pos` list; entities without one are skipped.
fn entity_position(data: &NbtMap) -> Option<(f64, f64, f64)> {
    let list = data.get("Pos")?.as_list()?;
    if list.len() != 3 {
        return None;
    }
    Some((
        list[0].as_f64()?,
        list[1].as_f64()?,
        list[2].as_f64()?,
    ))
}
