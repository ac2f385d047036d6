//! Fixed capacity history of accepted fixes

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::geo::GeoCoord;
use super::HISTORY_CAPACITY;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// History of the most recent accepted fixes, newest at index 0.
///
/// Entries at or beyond `count` are stale and never returned.
#[derive(Debug, Clone, Default)]
pub struct PositionHistory {
    entries: [GeoCoord; HISTORY_CAPACITY],
    count: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionHistory {
    /// Number of valid entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&GeoCoord> {
        self.get(0)
    }

    /// Get the entry `age` accepted fixes ago, 0 being the newest.
    pub fn get(&self, age: usize) -> Option<&GeoCoord> {
        if age < self.count {
            Some(&self.entries[age])
        }
        else {
            None
        }
    }

    /// Shift all entries down by one and insert `coord` as the newest.
    pub fn push(&mut self, coord: GeoCoord) {
        self.entries.copy_within(0..HISTORY_CAPACITY - 1, 1);
        self.entries[0] = coord;

        if self.count < HISTORY_CAPACITY {
            self.count += 1;
        }
    }

    /// Find the oldest valid entry whose squared distance to `coord` is
    /// strictly greater than `min_distance_sq`.
    pub fn find_oldest_beyond(&self, coord: &GeoCoord, min_distance_sq: f64) -> Option<&GeoCoord> {
        self.entries[..self.count]
            .iter()
            .rev()
            .find(|e| e.distance_sq_to(coord) > min_distance_sq)
    }

    /// Copy out up to `count` entries, newest first.
    pub fn recent(&self, count: usize) -> Vec<GeoCoord> {
        self.entries[..self.count.min(count)].to_vec()
    }

    /// Invalidate all entries.
    pub fn clear(&mut self) {
        self.count = 0;
    }
}
