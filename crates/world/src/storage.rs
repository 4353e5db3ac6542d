use std::collections::BTreeMap;

use crate::{Chunk, ChunkPos};

/// In-memory chunk arena for one dimension.
/// Uses BTreeMap for deterministic iteration order.
#[derive(Default)]
pub struct ChunkStorage {
    chunks: BTreeMap<ChunkPos, Chunk>,
}

impl ChunkStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true when no chunks are currently stored.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Obtain mutable access to a chunk, creating it if necessary.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) -> &mut Chunk {
        self.chunks.entry(pos).or_insert_with(|| Chunk::new(pos))
    }

    /// Attempt to fetch a chunk immutably.
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Fetch a chunk mutably (without creating it).
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Iterate over currently resident chunk positions.
    pub fn iter_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    /// Iterate mutably over resident chunks in position order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> + '_ {
        self.chunks.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_chunk_creates_once() {
        let mut storage = ChunkStorage::new();
        let pos = ChunkPos::new(0, 0);
        storage.ensure_chunk(pos);
        storage.ensure_chunk(pos);
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(pos).map(Chunk::position), Some(pos));
    }

    #[test]
    fn iter_positions_is_deterministic() {
        let mut storage = ChunkStorage::new();

        // Insert in non-sorted order
        storage.ensure_chunk(ChunkPos::new(5, 5));
        storage.ensure_chunk(ChunkPos::new(1, 2));
        storage.ensure_chunk(ChunkPos::new(3, 0));
        storage.ensure_chunk(ChunkPos::new(0, 0));
        storage.ensure_chunk(ChunkPos::new(2, 1));

        let order: Vec<_> = storage.iter_positions().collect();
        let expected = vec![
            ChunkPos::new(0, 0),
            ChunkPos::new(1, 2),
            ChunkPos::new(2, 1),
            ChunkPos::new(3, 0),
            ChunkPos::new(5, 5),
        ];
        assert_eq!(order, expected);
    }

    #[test]
    fn get_returns_none_for_missing_chunk() {
        let mut storage = ChunkStorage::new();
        assert!(storage.is_empty());
        assert!(storage.get(ChunkPos::new(999, 999)).is_none());
        assert!(storage.get_mut(ChunkPos::new(999, 999)).is_none());
    }
}
