//! Set-like façade over a [`ViewEngine`], recomputed on every call.

use crate::engine::ViewEngine;
use crate::iter::ViewIter;
use crate::owner::Viewer;

/// The viewers of one entity, computed on demand.
///
/// Nothing is cached or copied: each method takes the engine lock, walks the
/// manual viewers and the current candidate lists, and releases the lock
/// before returning.
///
/// Manual viewers always come first, then auto viewers in the exact order of
/// the candidate lists. Candidates are not deduplicated; keeping a viewer in
/// only one list is the spatial index's job.
pub struct ViewSet<'a, P> {
    engine: &'a ViewEngine<P>,
}

impl<P> Clone for ViewSet<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for ViewSet<'_, P> {}

impl<'a, P: Viewer> ViewSet<'a, P> {
    pub(crate) const fn new(engine: &'a ViewEngine<P>) -> Self {
        Self { engine }
    }

    /// Number of viewers. O(manual + total candidates).
    #[must_use]
    pub fn len(&self) -> usize {
        let state = self.engine.state();
        state.manual_viewers().count() + state.auto_viewers().count()
    }

    /// Whether no viewer exists. Stops at the first one found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let state = self.engine.state();
        state.manual_viewers().next().is_none() && state.auto_viewers().next().is_none()
    }

    /// Whether `viewer` currently sees the entity.
    ///
    /// Scans every non-empty candidate list, not only the first one.
    #[must_use]
    pub fn contains(&self, viewer: &P) -> bool {
        let state = self.engine.state();
        if state.is_self(viewer) {
            return false;
        }
        if state.manual.contains(viewer) {
            return true;
        }

        let Some(lists) = &state.references else {
            return false;
        };
        state.is_auto_valid(viewer)
            && lists
                .iter()
                .filter(|list| !list.is_empty())
                .any(|list| list.contains(viewer))
    }

    /// Run `action` on every viewer while holding the lock.
    ///
    /// `action` may read the same engine again, but calling one of its
    /// mutators from inside `action` deadlocks.
    pub fn for_each(&self, mut action: impl FnMut(&P)) {
        let state = self.engine.state();
        state.manual_viewers().for_each(&mut action);
        state.auto_viewers().for_each(action);
    }

    /// Copy the current viewers out under a single lock acquisition.
    ///
    /// Unlike [`iter`](Self::iter), the result is one consistent point in time.
    #[must_use]
    pub fn snapshot(&self) -> Vec<P> {
        let state = self.engine.state();
        let mut viewers = Vec::with_capacity(state.manual.len());
        viewers.extend(state.manual_viewers().cloned());
        viewers.extend(state.auto_viewers().cloned());
        viewers
    }

    /// Step through the viewers one lock acquisition at a time.
    #[must_use]
    pub fn iter(&self) -> ViewIter<'a, P> {
        ViewIter::new(self.engine)
    }
}

impl<'a, P: Viewer> IntoIterator for ViewSet<'a, P> {
    type Item = P;
    type IntoIter = ViewIter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, P: Viewer> IntoIterator for &ViewSet<'a, P> {
    type Item = P;
    type IntoIter = ViewIter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
