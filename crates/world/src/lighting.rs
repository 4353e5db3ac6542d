//! Bounded block-light relaxation around a single seed voxel.
//!
//! Dynamic emitters never trigger a full relight. Instead every change (an
//! emitter appearing, leaving, moving or changing brightness) recomputes the
//! block-light channel in a diamond-shaped region around the affected voxel:
//! a breadth-first sweep that re-derives each voxel from its neighbours and
//! only fans out from voxels whose value actually changed.

use std::collections::VecDeque;

use bit_vec::BitVec;
use lumen_core::BlockPos;
use tracing::trace;

/// Maximum light level (0-15 range).
pub const MAX_LIGHT_LEVEL: u8 = 15;

/// Minimum light level (complete darkness).
pub const MIN_LIGHT_LEVEL: u8 = 0;

/// Voxels strictly closer than this Manhattan distance to the seed may be touched.
pub const PROPAGATION_RADIUS: u32 = 16;

/// Capacity of the scratch queue and visited set (one slot per packed offset).
pub const QUEUE_CAPACITY: usize = 1 << (3 * OFFSET_BITS);

/// Number of voxels inside the propagation region.
pub const REGION_VOLUME: usize = region_volume(PROPAGATION_RADIUS - 1);

const OFFSET_BITS: u32 = 5;
const OFFSET_MASK: u16 = (1 << OFFSET_BITS) - 1;
const OFFSET_BIAS: i32 = 16;

const fn region_volume(r: u32) -> usize {
    // Lattice points of the octahedron |x| + |y| + |z| <= r.
    let r = r as usize;
    (2 * r + 1) * (2 * r * r + 2 * r + 3) / 3
}

/// Type of light being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Skylight,
    BlockLight,
}

/// Narrow read/write view of a voxel world's light data.
pub trait LightStore {
    /// Stored light level for `channel` at `pos`.
    fn light(&self, channel: LightType, pos: BlockPos) -> u8;

    /// Overwrite the light level for `channel` at `pos`.
    fn set_light(&mut self, channel: LightType, pos: BlockPos, level: u8);

    /// Opacity of the block occupying `pos` (0 = fully transparent).
    fn block_opacity(&self, pos: BlockPos) -> u8;

    /// Light emitted by the block occupying `pos` itself.
    fn block_emission(&self, pos: BlockPos) -> u8;
}

/// Summary of one bounded recompute, for instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightUpdate {
    pub seed: BlockPos,
    /// Queue pops, including re-evaluations of the same voxel.
    pub nodes_processed: usize,
    /// Block-light writes. A voxel re-queued during the sweep may be
    /// written more than once, so this can exceed the region volume.
    pub writes: usize,
}

/// Pack a position relative to `seed` into 15 bits (5 per axis).
fn pack_offset(pos: BlockPos, seed: BlockPos) -> u16 {
    let x = (pos.x - seed.x + OFFSET_BIAS) as u16 & OFFSET_MASK;
    let y = (pos.y - seed.y + OFFSET_BIAS) as u16 & OFFSET_MASK;
    let z = (pos.z - seed.z + OFFSET_BIAS) as u16 & OFFSET_MASK;
    x | (y << OFFSET_BITS) | (z << (2 * OFFSET_BITS))
}

fn unpack_offset(packed: u16, seed: BlockPos) -> BlockPos {
    let x = (packed & OFFSET_MASK) as i32 - OFFSET_BIAS;
    let y = ((packed >> OFFSET_BITS) & OFFSET_MASK) as i32 - OFFSET_BIAS;
    let z = ((packed >> (2 * OFFSET_BITS)) & OFFSET_MASK) as i32 - OFFSET_BIAS;
    seed.add(x, y, z)
}

fn in_region(pos: BlockPos, seed: BlockPos) -> bool {
    pos.manhattan_distance(seed) < PROPAGATION_RADIUS
}

/// Re-derive the block light of one voxel from its neighbours and emitters.
///
/// `emitters` reports the dynamic emission at a position; the block's own
/// emission is folded in here. Returns `true` when the stored value changed.
pub fn relax_voxel<S, E>(store: &mut S, pos: BlockPos, emitters: &E) -> bool
where
    S: LightStore + ?Sized,
    E: Fn(BlockPos) -> u8,
{
    let current = store.light(LightType::BlockLight, pos);
    let decay = store.block_opacity(pos).max(1) as i32;
    let neighbor_max = pos
        .neighbors()
        .iter()
        .map(|&n| store.light(LightType::BlockLight, n))
        .max()
        .unwrap_or(MIN_LIGHT_LEVEL) as i32;
    let emitted = emitters(pos).max(store.block_emission(pos)) as i32;

    let next = (neighbor_max - decay)
        .max(emitted)
        .clamp(MIN_LIGHT_LEVEL as i32, MAX_LIGHT_LEVEL as i32) as u8;
    if next == current {
        return false;
    }
    store.set_light(LightType::BlockLight, pos, next);
    true
}

/// Reusable scratch state for bounded block-light recomputation.
pub struct LightPropagator {
    queue: VecDeque<u16>,
    queued: BitVec,
}

impl LightPropagator {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(QUEUE_CAPACITY),
            queued: BitVec::from_elem(QUEUE_CAPACITY, false),
        }
    }

    /// Recompute block light around `seed`.
    ///
    /// Voxels are processed first-in first-out. A voxel's queued bit is
    /// cleared as it is popped, so a later change next to it may queue it
    /// again; it then only spreads further if its value changes once more.
    pub fn recompute<S, E>(&mut self, store: &mut S, seed: BlockPos, emitters: E) -> LightUpdate
    where
        S: LightStore + ?Sized,
        E: Fn(BlockPos) -> u8,
    {
        self.queue.clear();
        self.queued.clear();

        let mut update = LightUpdate {
            seed,
            nodes_processed: 0,
            writes: 0,
        };

        let packed_seed = pack_offset(seed, seed);
        self.queue.push_back(packed_seed);
        self.queued.set(packed_seed as usize, true);

        while let Some(packed) = self.queue.pop_front() {
            self.queued.set(packed as usize, false);
            update.nodes_processed += 1;

            let pos = unpack_offset(packed, seed);
            if !relax_voxel(store, pos, &emitters) {
                continue;
            }
            update.writes += 1;

            for next in pos.neighbors() {
                if !in_region(next, seed) {
                    continue;
                }
                let packed_next = pack_offset(next, seed);
                if self.queued.get(packed_next as usize) == Some(false) {
                    self.queued.set(packed_next as usize, true);
                    self.queue.push_back(packed_next);
                }
            }
            debug_assert!(self.queue.len() <= REGION_VOLUME);
        }

        trace!(
            seed = %seed,
            nodes = update.nodes_processed,
            writes = update.writes,
            "block light recomputed"
        );
        update
    }
}

impl Default for LightPropagator {
    fn default() -> Self {
        Self::new()
    }
}
