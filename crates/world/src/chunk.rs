use lumen_core::BlockPos;
use std::fmt;

/// Chunk width (X axis) in voxels.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk height (Y axis) in voxels.
pub const CHUNK_SIZE_Y: usize = 256;
/// Chunk depth (Z axis) in voxels.
pub const CHUNK_SIZE_Z: usize = 16;
/// Total voxel count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z;

/// Block identifier referencing the block table.
pub type BlockId = u16;

/// Reserved ID for air.
pub const BLOCK_AIR: BlockId = 0;

/// Chunk-local position (X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    /// Convert to a linear index within the voxel array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE_X);
        debug_assert!(self.y < CHUNK_SIZE_Y);
        debug_assert!(self.z < CHUNK_SIZE_Z);
        (self.y * CHUNK_SIZE_Z + self.z) * CHUNK_SIZE_X + self.x
    }
}

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Split an absolute position into its chunk and chunk-local coordinates.
///
/// Returns `None` when `pos.y` lies outside the vertical build range.
pub fn split_block_pos(pos: BlockPos) -> Option<(ChunkPos, LocalPos)> {
    if pos.y < 0 || pos.y >= CHUNK_SIZE_Y as i32 {
        return None;
    }
    let chunk = ChunkPos::new(
        pos.x.div_euclid(CHUNK_SIZE_X as i32),
        pos.z.div_euclid(CHUNK_SIZE_Z as i32),
    );
    let local = LocalPos {
        x: pos.x.rem_euclid(CHUNK_SIZE_X as i32) as usize,
        y: pos.y as usize,
        z: pos.z.rem_euclid(CHUNK_SIZE_Z as i32) as usize,
    };
    Some((chunk, local))
}

/// Per-voxel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Voxel {
    pub id: BlockId,
    pub light_sky: u8,
    pub light_block: u8,
}

impl Voxel {
    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == BLOCK_AIR
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Dirty flags set whenever chunk data changes.
    pub struct DirtyFlags: u8 {
        const BLOCKS = 0b0000_0001;
        const LIGHT = 0b0000_0010;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        DirtyFlags::empty()
    }
}

/// Chunk storing voxel data plus dirty flags.
pub struct Chunk {
    position: ChunkPos,
    voxels: Vec<Voxel>,
    dirty: DirtyFlags,
}

impl Chunk {
    /// Allocate a fresh, dark chunk filled with air.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            voxels: vec![Voxel::default(); CHUNK_VOLUME],
            dirty: DirtyFlags::empty(),
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Fetch a voxel copy.
    pub fn voxel(&self, local: LocalPos) -> Voxel {
        self.voxels[local.index()]
    }

    /// Replace the block id, keeping stored light.
    pub fn set_block(&mut self, local: LocalPos, id: BlockId) {
        let voxel = &mut self.voxels[local.index()];
        if voxel.id != id {
            voxel.id = id;
            self.dirty.insert(DirtyFlags::BLOCKS);
        }
    }

    /// Write the block-light channel.
    pub fn set_block_light(&mut self, local: LocalPos, level: u8) {
        let voxel = &mut self.voxels[local.index()];
        if voxel.light_block != level {
            voxel.light_block = level;
            self.dirty.insert(DirtyFlags::LIGHT);
        }
    }

    /// Write the sky-light channel.
    pub fn set_sky_light(&mut self, local: LocalPos, level: u8) {
        let voxel = &mut self.voxels[local.index()];
        if voxel.light_sky != level {
            voxel.light_sky = level;
            self.dirty.insert(DirtyFlags::LIGHT);
        }
    }

    /// Consume and return the current dirty flags.
    pub fn take_dirty_flags(&mut self) -> DirtyFlags {
        let flags = self.dirty;
        self.dirty = DirtyFlags::empty();
        flags
    }
}
