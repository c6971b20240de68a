use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use quartz_nbt::{NbtCompound, NbtList, NbtTag};

use crate::export::ExportError;
use crate::palette::Palette;
use crate::utils::nbt::NbtMap;
use crate::BlockState;

/// One non-background voxel: box-relative position, palette index, and any
/// attached block-entity data (absolute x/y/z already stripped).
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntry {
    pub pos: (i32, i32, i32),
    pub state: usize,
    pub nbt: Option<NbtMap>,
}

/// One free-floating entity contained in the box. `pos` is the box-relative
/// float position; `block_pos` is floor(absolute) - box.min, kept separate
/// because block-anchored data is keyed that way elsewhere in the format.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEntry {
    pub pos: (f64, f64, f64),
    pub block_pos: (i32, i32, i32),
    pub nbt: NbtMap,
}

/// A self-contained structure document: size, deduplicated palette, block
/// list in Y-major/Z/X scan order, and entities.
#[derive(Debug, Clone, Default)]
pub struct StructureDocument {
    pub size: (i32, i32, i32),
    pub palette: Palette,
    pub blocks: Vec<BlockEntry>,
    pub entities: Vec<EntityEntry>,
}

impl StructureDocument {
    pub fn new(size: (i32, i32, i32)) -> Self {
        StructureDocument {
            size,
            palette: Palette::new(),
            blocks: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn to_nbt(&self) -> NbtCompound {
        let mut root = NbtCompound::new();

        root.insert(
            "size",
            NbtTag::IntArray(vec![self.size.0, self.size.1, self.size.2]),
        );
        root.insert("palette", NbtTag::List(self.palette.to_nbt()));

        let mut blocks = NbtList::new();
        for block in &self.blocks {
            let mut entry = NbtCompound::new();
            entry.insert(
                "pos",
                NbtTag::IntArray(vec![block.pos.0, block.pos.1, block.pos.2]),
            );
            entry.insert("state", NbtTag::Int(block.state as i32));
            if let Some(nbt) = &block.nbt {
                entry.insert("nbt", NbtTag::Compound(nbt.to_quartz_nbt()));
            }
            blocks.push(NbtTag::Compound(entry));
        }
        root.insert("blocks", NbtTag::List(blocks));

        let mut entities = NbtList::new();
        for entity in &self.entities {
            let mut entry = NbtCompound::new();
            entry.insert(
                "pos",
                NbtTag::List(NbtList::from(vec![
                    NbtTag::Double(entity.pos.0),
                    NbtTag::Double(entity.pos.1),
                    NbtTag::Double(entity.pos.2),
                ])),
            );
            entry.insert(
                "blockPos",
                NbtTag::IntArray(vec![
                    entity.block_pos.0,
                    entity.block_pos.1,
                    entity.block_pos.2,
                ]),
            );
            entry.insert("nbt", NbtTag::Compound(entity.nbt.to_quartz_nbt()));
            entities.push(NbtTag::Compound(entry));
        }
        root.insert("entities", NbtTag::List(entities));

        root
    }

    /// Serialize to a gzip-compressed NBT byte stream.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let root = self.to_nbt();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        quartz_nbt::io::write_nbt(
            &mut encoder,
            None,
            &root,
            quartz_nbt::io::Flavor::Uncompressed,
        )?;
        Ok(encoder.finish()?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Parse a document back from its gzip-compressed byte stream.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ExportError> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;

        let (root, _) = quartz_nbt::io::read_nbt(
            &mut std::io::Cursor::new(decompressed),
            quartz_nbt::io::Flavor::Uncompressed,
        )?;

        let size = read_int3(&root, "size")?;

        let palette_list = root
            .get::<_, &NbtList>("palette")
            .map_err(|e| ExportError::InvalidDocument(format!("missing palette: {}", e)))?;
        let mut palette = Palette::new();
        for tag in palette_list.iter() {
            let compound = as_compound(tag, "palette entry")?;
            let state = BlockState::from_nbt(compound).map_err(ExportError::InvalidDocument)?;
            palette.get_or_add(&state);
        }

        let blocks_list = root
            .get::<_, &NbtList>("blocks")
            .map_err(|e| ExportError::InvalidDocument(format!("missing blocks: {}", e)))?;
        let mut blocks = Vec::new();
        for tag in blocks_list.iter() {
            let compound = as_compound(tag, "block entry")?;
            let pos = read_int3(compound, "pos")?;
            let state = compound
                .get::<_, i32>("state")
                .map_err(|e| ExportError::InvalidDocument(format!("missing state: {}", e)))?;
            let nbt = compound
                .get::<_, &NbtCompound>("nbt")
                .ok()
                .map(NbtMap::from_quartz_nbt);
            blocks.push(BlockEntry {
                pos,
                state: state as usize,
                nbt,
            });
        }

        let entities_list = root
            .get::<_, &NbtList>("entities")
            .map_err(|e| ExportError::InvalidDocument(format!("missing entities: {}", e)))?;
        let mut entities = Vec::new();
        for tag in entities_list.iter() {
            let compound = as_compound(tag, "entity entry")?;
            let pos_list = compound
                .get::<_, &NbtList>("pos")
                .map_err(|e| ExportError::InvalidDocument(format!("missing entity pos: {}", e)))?;
            if pos_list.len() != 3 {
                return Err(ExportError::InvalidDocument(
                    "entity pos must have 3 components".to_string(),
                ));
            }
            let pos = (
                read_double(pos_list, 0)?,
                read_double(pos_list, 1)?,
                read_double(pos_list, 2)?,
            );
            let block_pos = read_int3(compound, "blockPos")?;
            let nbt = compound
                .get::<_, &NbtCompound>("nbt")
                .map(NbtMap::from_quartz_nbt)
                .map_err(|e| ExportError::InvalidDocument(format!("missing entity nbt: {}", e)))?;
            entities.push(EntityEntry {
                pos,
                block_pos,
                nbt,
            });
        }

        Ok(StructureDocument {
            size,
            palette,
            blocks,
            entities,
        })
    }
}

fn as_compound<'a>(tag: &'a NbtTag, what: &str) -> Result<&'a NbtCompound, ExportError> {
    match tag {
        NbtTag::Compound(compound) => Ok(compound),
        other => Err(ExportError::InvalidDocument(format!(
            "{} is not a compound: {:?}",
            what, other
        ))),
    }
}

fn read_int3(compound: &NbtCompound, key: &str) -> Result<(i32, i32, i32), ExportError> {
    match compound.get::<_, &NbtTag>(key) {
        Ok(NbtTag::IntArray(values)) if values.len() == 3 => {
            Ok((values[0], values[1], values[2]))
        }
        Ok(other) => Err(ExportError::InvalidDocument(format!(
            "'{}' is not a 3-element int array: {:?}",
            key, other
        ))),
        Err(e) => Err(ExportError::InvalidDocument(format!(
            "missing '{}': {}",
            key, e
        ))),
    }
}

fn read_double(list: &NbtList, index: usize) -> Result<f64, ExportError> {
    list.get::<f64>(index)
        .map_err(|e| ExportError::InvalidDocument(format!("bad double at index {}: {}", index, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::nbt::NbtValue;

    #[test]
    fn test_round_trip_preserves_palette_order_and_blocks() {
        let mut doc = StructureDocument::new((2, 1, 3));
        let stone = BlockState::new("minecraft", "stone");
        let lamp = BlockState::new("minecraft", "redstone_lamp").with_property("lit", "false");

        let stone_idx = doc.palette.get_or_add(&stone);
        let lamp_idx = doc.palette.get_or_add(&lamp);

        for (i, pos) in [(0, 0, 0), (1, 0, 0), (0, 0, 1), (1, 0, 1), (0, 0, 2)]
            .iter()
            .enumerate()
        {
            doc.blocks.push(BlockEntry {
                pos: *pos,
                state: if i % 2 == 0 { stone_idx } else { lamp_idx },
                nbt: None,
            });
        }

        let bytes = doc.to_bytes().unwrap();
        let parsed = StructureDocument::from_bytes(&bytes).unwrap();

        assert_eq!(parsed.size, (2, 1, 3));
        assert_eq!(parsed.palette.len(), 2);
        assert_eq!(parsed.palette.get(0), Some(&stone));
        assert_eq!(parsed.palette.get(1), Some(&lamp));
        assert_eq!(parsed.blocks.len(), 5);
        for (original, parsed) in doc.blocks.iter().zip(parsed.blocks.iter()) {
            assert_eq!(original.pos, parsed.pos);
            assert_eq!(original.state, parsed.state);
        }
        assert!(parsed.entities.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_block_nbt_and_entities() {
        let mut doc = StructureDocument::new((1, 1, 1));
        let chest = BlockState::new("minecraft", "chest");
        let idx = doc.palette.get_or_add(&chest);

        let mut chest_nbt = NbtMap::new();
        chest_nbt.insert("CustomName", NbtValue::String("loot".to_string()));
        doc.blocks.push(BlockEntry {
            pos: (0, 0, 0),
            state: idx,
            nbt: Some(chest_nbt.clone()),
        });

        let mut pig = NbtMap::new();
        pig.insert("id", NbtValue::String("minecraft:pig".to_string()));
        doc.entities.push(EntityEntry {
            pos: (0.5, 0.0, 0.9),
            block_pos: (0, 0, 0),
            nbt: pig.clone(),
        });

        let parsed = StructureDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();

        assert_eq!(parsed.blocks[0].nbt, Some(chest_nbt));
        assert_eq!(parsed.entities.len(), 1);
        assert_eq!(parsed.entities[0].block_pos, (0, 0, 0));
        assert!((parsed.entities[0].pos.0 - 0.5).abs() < 1e-9);
        assert!((parsed.entities[0].pos.2 - 0.9).abs() < 1e-9);
        assert_eq!(parsed.entities[0].nbt, pig);
    }

    #[test]
    fn test_placeholder_document_keeps_size_only() {
        let doc = StructureDocument::new((4, 5, 6));
        let parsed = StructureDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();

        assert_eq!(parsed.size, (4, 5, 6));
        assert!(parsed.palette.is_empty());
        assert!(parsed.blocks.is_empty());
        assert!(parsed.entities.is_empty());
    }
}
