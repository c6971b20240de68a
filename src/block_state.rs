use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use quartz_nbt::{NbtCompound, NbtTag};
use serde::{Deserialize, Serialize};

/// A voxel state: namespaced block name plus its property map.
///
/// Two states are equal iff the qualified name and the property pairs match;
/// property order never matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub namespace: String,
    pub base_name: String,
    pub properties: HashMap<String, String>,
}

impl Hash for BlockState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.base_name.hash(state);
        for (k, v) in self.sorted_properties() {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl BlockState {
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>) -> Self {
        BlockState {
            namespace: namespace.into(),
            base_name: base_name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// `namespace:base_name`.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }

    /// The background state the document scan skips. Matches on the base
    /// name only, like the host registry does.
    pub fn is_air(&self) -> bool {
        self.base_name == "air"
    }

    fn sorted_properties(&self) -> Vec<(&String, &String)> {
        let mut props: Vec<_> = self.properties.iter().collect();
        props.sort();
        props
    }

    /// Palette entry shape: `{Name, Properties?}`, Properties omitted when
    /// the state has none.
    pub fn to_nbt(&self) -> NbtTag {
        let mut compound = NbtCompound::new();
        compound.insert("Name", self.qualified_name());

        if !self.properties.is_empty() {
            let mut properties = NbtCompound::new();
            for (key, value) in self.sorted_properties() {
                properties.insert(key, value.clone());
            }
            compound.insert("Properties", properties);
        }

        NbtTag::Compound(compound)
    }

    pub fn from_nbt(compound: &NbtCompound) -> Result<Self, String> {
        let name = compound
            .get::<_, &str>("Name")
            .map_err(|e| format!("Failed to get Name: {}", e))?;
        let (namespace, base_name) = match name.split_once(':') {
            Some((ns, base)) => (ns.to_string(), base.to_string()),
            None => ("minecraft".to_string(), name.to_string()),
        };

        let mut properties = HashMap::new();
        if let Ok(props) = compound.get::<_, &NbtCompound>("Properties") {
            for (key, value) in props.inner() {
                if let NbtTag::String(value_str) = value {
                    properties.insert(key.clone(), value_str.clone());
                }
            }
        }

        Ok(BlockState {
            namespace,
            base_name,
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::BlockState;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(state: &BlockState) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_block_state_creation() {
        let block = BlockState::new("minecraft", "stone").with_property("variant", "granite");

        assert_eq!(block.qualified_name(), "minecraft:stone");
        assert_eq!(block.properties.get("variant"), Some(&"granite".to_string()));
        assert!(!block.is_air());
        assert!(BlockState::new("minecraft", "air").is_air());
    }

    #[test]
    fn test_equality_ignores_property_order() {
        let a = BlockState::new("minecraft", "oak_stairs")
            .with_property("facing", "north")
            .with_property("half", "bottom");
        let b = BlockState::new("minecraft", "oak_stairs")
            .with_property("half", "bottom")
            .with_property("facing", "north");

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_nbt_shape() {
        let block = BlockState::new("minecraft", "lever").with_property("powered", "true");
        let tag = block.to_nbt();

        if let quartz_nbt::NbtTag::Compound(compound) = tag {
            let back = BlockState::from_nbt(&compound).unwrap();
            assert_eq!(back, block);
        } else {
            panic!("expected compound tag");
        }

        let plain = BlockState::new("minecraft", "stone");
        if let quartz_nbt::NbtTag::Compound(compound) = plain.to_nbt() {
            assert!(compound.get::<_, &quartz_nbt::NbtCompound>("Properties").is_err());
        } else {
            panic!("expected compound tag");
        }
    }
}
