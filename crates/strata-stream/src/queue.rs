//! Nearest-first queue of coordinates waiting for a job slot.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use strata_voxel::ChunkCoord;

/// Ordering key: Chebyshev ring first, then squared distance so that ring
/// corners come last.
type Priority = (u32, u64);

fn priority(viewer: ChunkCoord, coord: ChunkCoord) -> Priority {
    (viewer.chebyshev_distance(coord), viewer.distance_sq(coord))
}

/// Min-heap of pending coordinates with a dedup guard.
#[derive(Debug, Default)]
pub struct ChunkQueue {
    heap: BinaryHeap<Reverse<(Priority, ChunkCoord)>>,
    pending: FxHashSet<ChunkCoord>,
}

impl ChunkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `coord` ranked by its distance to `viewer`. Returns `false`
    /// if it was already queued.
    pub fn enqueue(&mut self, coord: ChunkCoord, viewer: ChunkCoord) -> bool {
        if !self.pending.insert(coord) {
            return false;
        }
        self.heap.push(Reverse((priority(viewer, coord), coord)));
        true
    }

    /// Removes and returns the nearest pending coordinate.
    pub fn dequeue(&mut self) -> Option<ChunkCoord> {
        while let Some(Reverse((_, coord))) = self.heap.pop() {
            if self.pending.remove(&coord) {
                return Some(coord);
            }
        }
        None
    }

    /// Drops `coord` from the queue. The heap entry is skipped lazily.
    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        self.pending.remove(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }

    /// Drops every coordinate farther than `range` from `viewer` and re-ranks
    /// the rest against the new viewer. Returns how many were dropped.
    pub fn retain_within(&mut self, viewer: ChunkCoord, range: u32) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|coord| viewer.chebyshev_distance(*coord) <= range);
        self.heap = self
            .pending
            .iter()
            .map(|&coord| Reverse((priority(viewer, coord), coord)))
            .collect();
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_first() {
        let viewer = ChunkCoord::new(0, 0);
        let mut queue = ChunkQueue::new();
        queue.enqueue(ChunkCoord::new(3, 0), viewer);
        queue.enqueue(ChunkCoord::new(1, 1), viewer);
        queue.enqueue(ChunkCoord::new(0, 1), viewer);
        queue.enqueue(ChunkCoord::new(0, 0), viewer);

        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(0, 0)));
        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(0, 1)));
        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(1, 1)));
        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(3, 0)));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_duplicates_ignored() {
        let viewer = ChunkCoord::new(0, 0);
        let mut queue = ChunkQueue::new();
        assert!(queue.enqueue(ChunkCoord::new(1, 0), viewer));
        assert!(!queue.enqueue(ChunkCoord::new(1, 0), viewer));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(1, 0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_removed_entry_skipped() {
        let viewer = ChunkCoord::new(0, 0);
        let mut queue = ChunkQueue::new();
        queue.enqueue(ChunkCoord::new(0, 0), viewer);
        queue.enqueue(ChunkCoord::new(2, 0), viewer);
        assert!(queue.remove(ChunkCoord::new(0, 0)));
        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(2, 0)));
    }

    #[test]
    fn test_retain_within_reranks() {
        let mut queue = ChunkQueue::new();
        let origin = ChunkCoord::new(0, 0);
        queue.enqueue(ChunkCoord::new(0, 0), origin);
        queue.enqueue(ChunkCoord::new(4, 0), origin);
        queue.enqueue(ChunkCoord::new(-4, 0), origin);

        let viewer = ChunkCoord::new(4, 0);
        let dropped = queue.retain_within(viewer, 4);
        assert_eq!(dropped, 1);
        assert!(!queue.contains(ChunkCoord::new(-4, 0)));
        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(4, 0)));
        assert_eq!(queue.dequeue(), Some(ChunkCoord::new(0, 0)));
    }
}
