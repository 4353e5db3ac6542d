//! In-memory voxel world: chunked blocks and light plus an entity population.
//!
//! This is the reference store the lighting engine runs against in the demo
//! and in tests. Chunks are allocated lazily on first write, so the world is
//! unbounded horizontally; heights outside the chunk range read as dark air
//! and ignore writes.

use std::collections::BTreeMap;

use lumen_core::{BlockPos, DimensionId};

use crate::blocks::BlockTable;
use crate::chunk::{split_block_pos, BlockId, ChunkPos, DirtyFlags, BLOCK_AIR};
use crate::entity::{Entity, EntityId, EntityKind, EntityWorld};
use crate::lighting::{LightStore, LightType};
use crate::storage::ChunkStorage;

/// One dimension's blocks, light and entities.
pub struct VoxelWorld {
    dimension: DimensionId,
    blocks: BlockTable,
    chunks: ChunkStorage,
    entities: BTreeMap<EntityId, Entity>,
    next_entity_id: u64,
}

impl VoxelWorld {
    pub fn new(dimension: DimensionId, blocks: BlockTable) -> Self {
        Self {
            dimension,
            blocks,
            chunks: ChunkStorage::new(),
            entities: BTreeMap::new(),
            // Keep ids from different dimensions disjoint.
            next_entity_id: (dimension as u64) << 48,
        }
    }

    pub fn blocks(&self) -> &BlockTable {
        &self.blocks
    }

    /// Number of allocated chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Block id at `pos` (air when unloaded or out of range).
    pub fn block(&self, pos: BlockPos) -> BlockId {
        split_block_pos(pos)
            .and_then(|(chunk, local)| self.chunks.get(chunk).map(|c| c.voxel(local).id))
            .unwrap_or(BLOCK_AIR)
    }

    /// Place a block. Stored light is left untouched; callers relight as needed.
    pub fn set_block(&mut self, pos: BlockPos, id: BlockId) {
        if let Some((chunk, local)) = split_block_pos(pos) {
            self.chunks.ensure_chunk(chunk).set_block(local, id);
        }
    }

    /// Spawn a new entity and return its id.
    pub fn spawn(&mut self, x: f64, y: f64, z: f64, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities
            .insert(id, Entity::new(id, self.dimension, x, y, z, kind));
        id
    }

    /// Move an existing entity (e.g. arriving through a portal) into this world.
    pub fn insert_entity(&mut self, mut entity: Entity) {
        entity.dimension = self.dimension;
        self.entities.insert(entity.id, entity);
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Remove an entity from the world.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Collect and clear chunks whose light changed since the last call.
    pub fn take_dirty_chunks(&mut self) -> Vec<ChunkPos> {
        self.chunks
            .iter_mut()
            .filter_map(|chunk| {
                chunk
                    .take_dirty_flags()
                    .contains(DirtyFlags::LIGHT)
                    .then(|| chunk.position())
            })
            .collect()
    }
}

impl LightStore for VoxelWorld {
    fn light(&self, channel: LightType, pos: BlockPos) -> u8 {
        let Some((chunk, local)) = split_block_pos(pos) else {
            return 0;
        };
        self.chunks
            .get(chunk)
            .map(|c| {
                let voxel = c.voxel(local);
                match channel {
                    LightType::Skylight => voxel.light_sky,
                    LightType::BlockLight => voxel.light_block,
                }
            })
            .unwrap_or(0)
    }

    fn set_light(&mut self, channel: LightType, pos: BlockPos, level: u8) {
        let Some((chunk, local)) = split_block_pos(pos) else {
            return;
        };
        let chunk = self.chunks.ensure_chunk(chunk);
        match channel {
            LightType::Skylight => chunk.set_sky_light(local, level),
            LightType::BlockLight => chunk.set_block_light(local, level),
        }
    }

    fn block_opacity(&self, pos: BlockPos) -> u8 {
        self.blocks.light_opacity(self.block(pos))
    }

    fn block_emission(&self, pos: BlockPos) -> u8 {
        self.blocks.light_emission(self.block(pos))
    }
}

impl EntityWorld for VoxelWorld {
    fn dimension(&self) -> DimensionId {
        self.dimension
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BLOCK_GLOWSTONE, BLOCK_STONE};

    fn world() -> VoxelWorld {
        VoxelWorld::new(DimensionId::Overworld, BlockTable::default())
    }

    #[test]
    fn unloaded_voxels_read_dark_air() {
        let world = world();
        let pos = BlockPos::new(100, 64, -100);
        assert_eq!(world.block(pos), BLOCK_AIR);
        assert_eq!(world.light(LightType::BlockLight, pos), 0);
        assert_eq!(world.block_opacity(pos), 0);
        assert_eq!(world.chunk_count(), 0);
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut world = world();
        let pos = BlockPos::new(0, -5, 0);
        world.set_light(LightType::BlockLight, pos, 9);
        world.set_block(pos, BLOCK_STONE);
        assert_eq!(world.light(LightType::BlockLight, pos), 0);
        assert_eq!(world.chunk_count(), 0);
    }

    #[test]
    fn block_properties_come_from_table() {
        let mut world = world();
        let pos = BlockPos::new(3, 10, 3);
        world.set_block(pos, BLOCK_GLOWSTONE);
        assert_eq!(world.block_opacity(pos), 15);
        assert_eq!(world.block_emission(pos), 15);
    }

    #[test]
    fn channels_are_independent() {
        let mut world = world();
        let pos = BlockPos::new(-1, 20, 17);
        world.set_light(LightType::Skylight, pos, 15);
        world.set_light(LightType::BlockLight, pos, 4);
        assert_eq!(world.light(LightType::Skylight, pos), 15);
        assert_eq!(world.light(LightType::BlockLight, pos), 4);
    }

    #[test]
    fn dirty_chunks_report_light_changes_once() {
        let mut world = world();
        world.set_light(LightType::BlockLight, BlockPos::new(0, 1, 0), 3);
        world.set_light(LightType::BlockLight, BlockPos::new(-1, 1, 0), 3);
        let dirty = world.take_dirty_chunks();
        assert_eq!(dirty, vec![ChunkPos::new(-1, 0), ChunkPos::new(0, 0)]);
        assert!(world.take_dirty_chunks().is_empty());
    }

    #[test]
    fn entity_lifecycle() {
        let mut world = world();
        let id = world.spawn(0.5, 64.0, 0.5, EntityKind::Mob);
        assert!(world.contains_entity(id));
        assert_eq!(world.entities().count(), 1);

        world.entity_mut(id).unwrap().set_position(3.0, 64.0, 0.5);
        assert_eq!(world.entity(id).unwrap().block_pos(), BlockPos::new(3, 64, 0));

        let entity = world.despawn(id).unwrap();
        assert!(!world.contains_entity(id));

        let mut nether = VoxelWorld::new(DimensionId::Nether, BlockTable::default());
        nether.insert_entity(entity);
        assert_eq!(nether.entity(id).unwrap().dimension, DimensionId::Nether);
    }

    #[test]
    fn entity_ids_are_disjoint_across_dimensions() {
        let mut overworld = world();
        let mut nether = VoxelWorld::new(DimensionId::Nether, BlockTable::default());
        let a = overworld.spawn(0.0, 0.0, 0.0, EntityKind::Mob);
        let b = nether.spawn(0.0, 0.0, 0.0, EntityKind::Mob);
        assert_ne!(a, b);
    }
}
