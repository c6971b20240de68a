use std::collections::HashMap;

use quartz_nbt::{NbtList, NbtTag};

use crate::BlockState;

/// Deduplicating block-state palette with stable first-seen indices.
///
/// Scoped to a single export of a single marker; indices are 0-based and
/// dense. The palette starts empty because the background state never
/// enters a document.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    states: Vec<BlockState>,
    index: HashMap<BlockState, usize>,
}

impl Palette {
    pub fn new() -> Self {
        Palette {
            states: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the index of `state`, assigning the next free index on first
    /// sight. Idempotent for equal states.
    pub fn get_or_add(&mut self, state: &BlockState) -> usize {
        if let Some(&index) = self.index.get(state) {
            return index;
        }
        let index = self.states.len();
        self.states.push(state.clone());
        self.index.insert(state.clone(), index);
        index
    }

    pub fn get(&self, index: usize) -> Option<&BlockState> {
        self.states.get(index)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn to_nbt(&self) -> NbtList {
        NbtList::from(self.states.iter().map(|s| s.to_nbt()).collect::<Vec<NbtTag>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_operations() {
        let mut palette = Palette::new();

        let stone = BlockState::new("minecraft", "stone");
        let dirt = BlockState::new("minecraft", "dirt");

        assert_eq!(palette.get_or_add(&stone), 0);
        assert_eq!(palette.get_or_add(&dirt), 1);
        assert_eq!(palette.get_or_add(&stone), 0);

        assert_eq!(palette.get(0), Some(&stone));
        assert_eq!(palette.get(1), Some(&dirt));
        assert_eq!(palette.get(2), None);

        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn test_property_variants_are_distinct() {
        let mut palette = Palette::new();

        let open = BlockState::new("minecraft", "oak_door").with_property("open", "true");
        let closed = BlockState::new("minecraft", "oak_door").with_property("open", "false");
        let open_reordered = BlockState::new("minecraft", "oak_door").with_property("open", "true");

        assert_eq!(palette.get_or_add(&open), 0);
        assert_eq!(palette.get_or_add(&closed), 1);
        assert_eq!(palette.get_or_add(&open_reordered), 0);
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn test_fresh_indices_are_dense() {
        let mut palette = Palette::new();
        for i in 0..50 {
            let state = BlockState::new("minecraft", format!("block_{}", i));
            assert_eq!(palette.get_or_add(&state), i);
        }
        assert_eq!(palette.len(), 50);
    }
}
