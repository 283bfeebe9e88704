//! Manually added viewers stored as a dense table.
//!
//! Rows are kept contiguous so an iterator can remember a row number between
//! lock acquisitions instead of borrowing the set. Removal swaps the last row
//! into the hole, the same way archetype tables recycle entity rows.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::owner::Viewer;

/// Insertion-ordered set of viewers with O(1) membership and removal.
pub struct ManualViewers<P> {
    /// Viewers in row order.
    rows: Vec<P>,
    /// Map from viewer to its row in `rows`.
    index: HashMap<P, usize, FxBuildHasher>,
}

impl<P: Viewer> ManualViewers<P> {
    /// Create a table with room for `capacity` viewers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Add a viewer. Returns `false` if it was already present.
    pub fn insert(&mut self, viewer: P) -> bool {
        if self.index.contains_key(&viewer) {
            return false;
        }

        let row = self.rows.len();
        self.index.insert(viewer.clone(), row);
        self.rows.push(viewer);
        true
    }

    /// Remove a viewer. Returns `false` if it was not present.
    pub fn remove(&mut self, viewer: &P) -> bool {
        let Some(row) = self.index.remove(viewer) else {
            return false;
        };

        self.rows.swap_remove(row);

        // The former last row now lives at `row`
        if let Some(moved) = self.rows.get(row) {
            if let Some(slot) = self.index.get_mut(moved) {
                *slot = row;
            }
        }
        true
    }

    #[must_use]
    pub fn contains(&self, viewer: &P) -> bool {
        !self.index.is_empty() && self.index.contains_key(viewer)
    }

    /// Viewer stored at `row`, if the table is that long.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&P> {
        self.rows.get(row)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate viewers in row order.
    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.rows.iter()
    }
}
