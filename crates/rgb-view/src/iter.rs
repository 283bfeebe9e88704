//! Step-wise iteration over an engine's viewers.
//!
//! The iterator keeps plain positions between steps and re-locks the engine
//! for each one, so it never pins the engine lock or a candidate list. The
//! price is that the traversal is not a snapshot:
//!
//! ```text
//! Manual { row } ──rows exhausted──▶ Auto { list, pos } ──lists exhausted──▶ Exhausted
//! ```
//!
//! - a manual viewer swapped into an already visited row is skipped
//! - a manual viewer appended before the manual phase ends is picked up
//! - after `update_references`, positions are applied to the new lists

use crate::engine::{ViewEngine, ViewState};
use crate::owner::Viewer;

/// Where the next search resumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    /// Next manual row to read.
    Manual { row: usize },
    /// Next element `pos` of candidate list `list`.
    Auto { list: usize, pos: usize },
    /// Terminal; never left.
    Exhausted,
}

/// Iterator over the viewers of one entity.
///
/// Created by [`ViewSet::iter`](crate::ViewSet::iter). Every step takes the
/// engine lock on its own.
pub struct ViewIter<'a, P> {
    engine: &'a ViewEngine<P>,
    cursor: Cursor,
    /// Viewer found by `has_next` and not yet handed out.
    pending: Option<P>,
}

impl<'a, P: Viewer> ViewIter<'a, P> {
    pub(crate) const fn new(engine: &'a ViewEngine<P>) -> Self {
        Self {
            engine,
            cursor: Cursor::Manual { row: 0 },
            pending: None,
        }
    }

    /// Whether another viewer follows, buffering it for the next call to `next`.
    pub fn has_next(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }

        let engine = self.engine;
        let state = engine.state();
        self.pending = self.advance(&state);
        self.pending.is_some()
    }

    /// Whether the manual viewers have been used up.
    #[cfg(test)]
    fn in_auto_phase(&self) -> bool {
        !matches!(self.cursor, Cursor::Manual { .. })
    }

    /// Move the cursor to the next viewer and return it.
    fn advance(&mut self, state: &ViewState<P>) -> Option<P> {
        if let Cursor::Manual { mut row } = self.cursor {
            while let Some(viewer) = state.manual.get(row) {
                row += 1;
                if !state.is_self(viewer) {
                    self.cursor = Cursor::Manual { row };
                    return Some(viewer.clone());
                }
            }
            self.cursor = Cursor::Auto { list: 0, pos: 0 };
        }

        let Cursor::Auto { mut list, mut pos } = self.cursor else {
            return None;
        };

        let Some(lists) = &state.references else {
            self.cursor = Cursor::Exhausted;
            return None;
        };

        while let Some(viewers) = lists.get(list) {
            while let Some(viewer) = viewers.get(pos) {
                pos += 1;
                if state.is_auto_valid(viewer) {
                    self.cursor = Cursor::Auto { list, pos };
                    return Some(viewer.clone());
                }
            }
            list += 1;
            pos = 0;
        }

        self.cursor = Cursor::Exhausted;
        None
    }
}

impl<P: Viewer> Iterator for ViewIter<'_, P> {
    type Item = P;

    fn next(&mut self) -> Option<P> {
        if let Some(viewer) = self.pending.take() {
            return Some(viewer);
        }

        let engine = self.engine;
        let state = engine.state();
        self.advance(&state)
    }
}

impl<P: Viewer> std::iter::FusedIterator for ViewIter<'_, P> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owner::{References, ViewerList};

    fn refs(lists: &[&[u32]]) -> References<u32> {
        lists.iter().map(|list| ViewerList::from(*list)).collect()
    }

    #[test]
    fn test_manual_then_auto_order() {
        let engine = ViewEngine::detached();
        engine.update_references(Some(refs(&[&[1, 2], &[], &[3]])));
        engine.manual_add(10_u32);
        engine.manual_add(11);

        let viewers: Vec<_> = engine.as_set().iter().collect();
        assert_eq!(viewers, vec![10, 11, 1, 2, 3]);
    }

    #[test]
    fn test_first_list_is_visited() {
        let engine = ViewEngine::detached();
        engine.update_references(Some(refs(&[&[1], &[2]])));

        assert_eq!(engine.as_set().iter().collect::<Vec<u32>>(), vec![1, 2]);
    }

    #[test]
    fn test_has_next_buffers_one_viewer() {
        let engine = ViewEngine::detached();
        engine.update_references(Some(refs(&[&[1]])));

        let mut iter = engine.as_set().iter();
        assert!(iter.has_next());
        assert!(iter.has_next());
        assert_eq!(iter.next(), Some(1_u32));
        assert!(!iter.has_next());
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_skips_exceptions() {
        let engine = ViewEngine::detached();
        engine.update_references(Some(refs(&[&[1, 2, 3]])));
        engine.manual_remove(2_u32);

        assert_eq!(engine.as_set().iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_no_references_ends_after_manual() {
        let engine = ViewEngine::detached();
        engine.manual_add(4_u32);

        let mut iter = engine.as_set().iter();
        assert!(!iter.in_auto_phase());
        assert_eq!(iter.next(), Some(4));
        assert_eq!(iter.next(), None);
        assert!(iter.in_auto_phase());
        assert_eq!(iter.cursor, Cursor::Exhausted);

        // Exhausted stays exhausted even when lists arrive later
        engine.update_references(Some(refs(&[&[5]])));
        assert!(!iter.has_next());
    }

    #[test]
    fn test_manual_added_mid_traversal_is_seen() {
        let engine = ViewEngine::detached();
        engine.manual_add(1_u32);

        let mut iter = engine.as_set().iter();
        assert_eq!(iter.next(), Some(1));
        engine.manual_add(2);
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_resumes_inside_swapped_references() {
        let engine = ViewEngine::detached();
        engine.update_references(Some(refs(&[&[1, 2, 3]])));

        let mut iter = engine.as_set().iter();
        assert_eq!(iter.next(), Some(1_u32));

        engine.update_references(Some(refs(&[&[7, 8, 9]])));
        assert_eq!(iter.collect::<Vec<_>>(), vec![8, 9]);
    }
}
