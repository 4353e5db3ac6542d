//! Block table: per-block light opacity and static emission.
//!
//! The table is data-driven (a JSON array of block definitions, id = array index)
//! with a small built-in default used by tests and as a fallback when no block
//! pack is available.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunk::BlockId;
use crate::lighting::MAX_LIGHT_LEVEL;

/// ID for stone in the default table.
pub const BLOCK_STONE: BlockId = 1;
/// ID for glass in the default table.
pub const BLOCK_GLASS: BlockId = 2;
/// ID for leaves in the default table.
pub const BLOCK_LEAVES: BlockId = 3;
/// ID for water in the default table.
pub const BLOCK_WATER: BlockId = 4;
/// ID for glowstone in the default table.
pub const BLOCK_GLOWSTONE: BlockId = 5;
/// ID for a placed torch in the default table.
pub const BLOCK_TORCH: BlockId = 6;
/// ID for a placed lantern in the default table.
pub const BLOCK_LANTERN: BlockId = 7;

/// Raw block definition as found in a block pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    #[serde(default)]
    pub opacity: u8,
    #[serde(default)]
    pub emission: u8,
}

/// Validated block metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Human-readable identifier (e.g., "stone").
    pub name: String,
    /// Light levels subtracted when light passes into this block (0-15).
    pub opacity: u8,
    /// Block light emitted by the block itself (0-15).
    pub emission: u8,
}

impl BlockDescriptor {
    /// Helper for tests and the default table.
    pub fn new(name: &str, opacity: u8, emission: u8) -> Self {
        Self {
            name: name.to_string(),
            opacity,
            emission,
        }
    }

    fn try_from_definition(def: BlockDefinition) -> Result<Self, BlockTableError> {
        for (field, value) in [("opacity", def.opacity), ("emission", def.emission)] {
            if value > MAX_LIGHT_LEVEL {
                return Err(BlockTableError::LevelOutOfRange {
                    name: def.name,
                    field,
                    value,
                });
            }
        }
        Ok(Self {
            name: def.name,
            opacity: def.opacity,
            emission: def.emission,
        })
    }
}

/// Errors raised while loading a block table.
#[derive(Debug, Error)]
pub enum BlockTableError {
    #[error("failed to parse block table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate block name {0:?}")]
    DuplicateName(String),
    #[error("block {name:?} has {field} {value}, above the maximum light level")]
    LevelOutOfRange {
        name: String,
        field: &'static str,
        value: u8,
    },
    #[error("block table defines no blocks")]
    Empty,
}

/// Registry storing block descriptors keyed by id.
#[derive(Debug, Clone)]
pub struct BlockTable {
    descriptors: Vec<BlockDescriptor>,
    name_to_id: HashMap<String, BlockId>,
}

impl BlockTable {
    /// Construct a table from validated descriptors.
    pub fn new(descriptors: Vec<BlockDescriptor>) -> Self {
        let mut name_to_id = HashMap::new();
        for (id, desc) in descriptors.iter().enumerate() {
            name_to_id.insert(desc.name.clone(), id as BlockId);
        }
        Self {
            descriptors,
            name_to_id,
        }
    }

    /// Parse a JSON block pack.
    pub fn from_json_str(contents: &str) -> Result<Self, BlockTableError> {
        let defs: Vec<BlockDefinition> = serde_json::from_str(contents)?;
        if defs.is_empty() {
            return Err(BlockTableError::Empty);
        }
        let mut descriptors: Vec<BlockDescriptor> = Vec::with_capacity(defs.len());
        for def in defs {
            if descriptors.iter().any(|d| d.name == def.name) {
                return Err(BlockTableError::DuplicateName(def.name));
            }
            descriptors.push(BlockDescriptor::try_from_definition(def)?);
        }
        Ok(Self::new(descriptors))
    }

    /// Look up a descriptor by numeric id.
    pub fn descriptor(&self, id: BlockId) -> Option<&BlockDescriptor> {
        self.descriptors.get(id as usize)
    }

    /// Resolve a block id by its name.
    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Light opacity of a block; unknown ids are transparent.
    pub fn light_opacity(&self, id: BlockId) -> u8 {
        self.descriptor(id).map(|d| d.opacity).unwrap_or(0)
    }

    /// Static block-light emission; unknown ids are dark.
    pub fn light_emission(&self, id: BlockId) -> u8 {
        self.descriptor(id).map(|d| d.emission).unwrap_or(0)
    }

    /// Number of defined blocks.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true when the table defines no blocks.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for BlockTable {
    fn default() -> Self {
        Self::new(vec![
            BlockDescriptor::new("air", 0, 0),
            BlockDescriptor::new("stone", 15, 0),
            BlockDescriptor::new("glass", 0, 0),
            BlockDescriptor::new("leaves", 1, 0),
            BlockDescriptor::new("water", 2, 0),
            BlockDescriptor::new("glowstone", 15, 15),
            BlockDescriptor::new("torch", 0, 14),
            BlockDescriptor::new("lantern", 0, 15),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::BLOCK_AIR;

    #[test]
    fn default_table_ids_match_constants() {
        let table = BlockTable::default();
        assert_eq!(table.id_by_name("air"), Some(BLOCK_AIR));
        assert_eq!(table.id_by_name("stone"), Some(BLOCK_STONE));
        assert_eq!(table.id_by_name("glass"), Some(BLOCK_GLASS));
        assert_eq!(table.id_by_name("leaves"), Some(BLOCK_LEAVES));
        assert_eq!(table.id_by_name("water"), Some(BLOCK_WATER));
        assert_eq!(table.id_by_name("glowstone"), Some(BLOCK_GLOWSTONE));
        assert_eq!(table.id_by_name("torch"), Some(BLOCK_TORCH));
        assert_eq!(table.id_by_name("lantern"), Some(BLOCK_LANTERN));
    }

    #[test]
    fn unknown_ids_are_transparent_and_dark() {
        let table = BlockTable::default();
        assert_eq!(table.light_opacity(999), 0);
        assert_eq!(table.light_emission(999), 0);
    }

    #[test]
    fn json_pack_loads_with_defaults() {
        let table = BlockTable::from_json_str(
            r#"[{"name":"air"},{"name":"stone","opacity":15},{"name":"lamp","emission":15}]"#,
        )
        .expect("valid pack");
        assert_eq!(table.len(), 3);
        assert_eq!(table.light_opacity(1), 15);
        assert_eq!(table.light_emission(2), 15);
        assert_eq!(table.light_opacity(2), 0);
    }

    #[test]
    fn json_pack_rejects_duplicates() {
        let err = BlockTable::from_json_str(r#"[{"name":"air"},{"name":"air"}]"#).unwrap_err();
        assert!(matches!(err, BlockTableError::DuplicateName(name) if name == "air"));
    }

    #[test]
    fn json_pack_rejects_out_of_range_levels() {
        let err =
            BlockTable::from_json_str(r#"[{"name":"air"},{"name":"sun","emission":16}]"#)
                .unwrap_err();
        assert!(matches!(
            err,
            BlockTableError::LevelOutOfRange {
                field: "emission",
                value: 16,
                ..
            }
        ));
    }

    #[test]
    fn json_pack_rejects_empty_and_malformed_input() {
        assert!(matches!(
            BlockTable::from_json_str("[]"),
            Err(BlockTableError::Empty)
        ));
        assert!(matches!(
            BlockTable::from_json_str("{not json"),
            Err(BlockTableError::Parse(_))
        ));
    }
}
