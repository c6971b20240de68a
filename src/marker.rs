//! Discovery of structure marker blocks inside a selection.
//!
//! Marker metadata is resolved with the fuzzy locator because the hosting
//! format renames and re-nests these fields between revisions. Every
//! failure here is soft: a candidate that cannot be resolved is dropped,
//! a chunk that cannot be loaded is skipped, and the scan carries on.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::diagnostics::{DiagnosticRecord, DiagnosticSink};
use crate::locator::{find_first_int, find_first_string, walk};
use crate::utils::nbt::NbtValue;
use crate::world::{Selection, WorldSource};

/// Block type that marks an exportable region.
pub const MARKER_BLOCK: &str = "minecraft:structure_block";

const NAME_KEYS: &[&str] = &["structurename", "structure_name", "name", "identifier"];

const OFFSET_X_KEYS: &[&str] = &["xstructureoffset", "structureoffsetx", "offsetx", "posx"];
const OFFSET_Y_KEYS: &[&str] = &["ystructureoffset", "structureoffsety", "offsety", "posy"];
const OFFSET_Z_KEYS: &[&str] = &["zstructureoffset", "structureoffsetz", "offsetz", "posz"];

const SIZE_X_KEYS: &[&str] = &["xstructuresize", "structuresizex", "sizex", "size_x"];
const SIZE_Y_KEYS: &[&str] = &["ystructuresize", "structuresizey", "sizey", "size_y"];
const SIZE_Z_KEYS: &[&str] = &["zstructuresize", "structuresizez", "sizez", "size_z"];

const NEAR_MISS_KEYS: &[&str] = &["name", "size", "offset", "pos"];
const NEAR_MISS_CAP: usize = 120;

/// A resolved marker: where it sits, what it names, and the box it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub position: (i32, i32, i32),
    pub identifier: String,
    pub offset: (i32, i32, i32),
    pub size: (i32, i32, i32),
}

impl MarkerRecord {
    pub fn target_box(&self) -> BoundingBox {
        BoundingBox::from_marker(self.position, self.offset, self.size)
    }
}

fn find_axis(tag: &NbtValue, keys: &[&str]) -> Option<i32> {
    i32::try_from(find_first_int(tag, keys)?).ok()
}

/// Resolve identifier, offset and size from a marker's data tree. Missing
/// identifier, any missing integer, or a size component <= 0 drops the
/// candidate.
pub fn parse_marker(position: (i32, i32, i32), tag: &NbtValue) -> Option<MarkerRecord> {
    let identifier = find_first_string(tag, NAME_KEYS)?;

    let offset = (
        find_axis(tag, OFFSET_X_KEYS)?,
        find_axis(tag, OFFSET_Y_KEYS)?,
        find_axis(tag, OFFSET_Z_KEYS)?,
    );
    let size = (
        find_axis(tag, SIZE_X_KEYS)?,
        find_axis(tag, SIZE_Y_KEYS)?,
        find_axis(tag, SIZE_Z_KEYS)?,
    );

    if size.0 <= 0 || size.1 <= 0 || size.2 <= 0 {
        return None;
    }

    Some(MarkerRecord {
        position,
        identifier,
        offset,
        size,
    })
}

fn render_value(value: &NbtValue) -> String {
    match value {
        NbtValue::String(s) => s.clone(),
        NbtValue::Byte(v) => v.to_string(),
        NbtValue::Short(v) => v.to_string(),
        NbtValue::Int(v) => v.to_string(),
        NbtValue::Long(v) => v.to_string(),
        NbtValue::Float(v) => v.to_string(),
        NbtValue::Double(v) => v.to_string(),
        other => format!("{:?}", other),
    }
}

/// Dump every key whose name looks relevant on a block entity that failed
/// to parse, capped so a pathological tree cannot flood the sink.
fn emit_near_misses(position: (i32, i32, i32), tag: &NbtValue, sink: &mut dyn DiagnosticSink) {
    let mut hits = 0;
    for entry in walk(tag) {
        let lowered = entry.key.to_lowercase();
        if !NEAR_MISS_KEYS.iter().any(|s| lowered.contains(s)) {
            continue;
        }
        sink.emit(DiagnosticRecord {
            position,
            path: entry.path,
            value: render_value(entry.value),
        });
        hits += 1;
        if hits >= NEAR_MISS_CAP {
            break;
        }
    }
}

/// Scan the selection for marker blocks and resolve each into a
/// [`MarkerRecord`], in chunk/block encounter order.
pub fn find_marker_blocks(
    world: &dyn WorldSource,
    dimension: &str,
    selection: &Selection,
    sink: &mut dyn DiagnosticSink,
) -> Vec<MarkerRecord> {
    let mut records = Vec::new();

    for (cx, cz) in selection.chunk_locations() {
        let chunk = match world.get_chunk(dimension, cx, cz) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("skipping chunk during marker scan: {}", e);
                continue;
            }
        };

        for (&position, data) in &chunk.block_entities {
            if !selection.contains(position) {
                continue;
            }
            if !is_marker_block(world, dimension, position) {
                continue;
            }

            let tag = NbtValue::Compound(data.clone());
            match parse_marker(position, &tag) {
                Some(record) => {
                    debug!(
                        "resolved marker '{}' at {:?}: offset {:?}, size {:?}",
                        record.identifier, position, record.offset, record.size
                    );
                    records.push(record);
                }
                None => {
                    debug!("marker at {:?} failed to resolve", position);
                    emit_near_misses(position, &tag, sink);
                }
            }
        }
    }

    records
}

fn is_marker_block(world: &dyn WorldSource, dimension: &str, position: (i32, i32, i32)) -> bool {
    match world.get_block(dimension, position.0, position.1, position.2) {
        Ok(state) => state.qualified_name() == MARKER_BLOCK,
        Err(_) => false,
    }
}
