//! The per-entity viewer engine.
//!
//! An entity's viewers come from two places:
//!
//! - **Manual** viewers, added explicitly and always visible.
//! - **Auto** viewers, taken from candidate lists owned by the spatial index
//!   (every player in the surrounding chunks).
//!
//! Auto viewers are never copied into the engine. The spatial index hands over
//! a shared [`References`] handle once per recompute and the engine filters it
//! on every query. Removing an auto viewer records an *exception* instead.
//!
//! All state sits behind one lock per engine. Each call is atomic on its own;
//! a traversal spanning several calls (an iterator) is not a snapshot.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashSet;
use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxBuildHasher;

use crate::manual::ManualViewers;
use crate::owner::{References, Subject, ViewOwner, Viewer};
use crate::set::ViewSet;

/// State guarded by the engine lock.
pub(crate) struct ViewState<P> {
    /// The owner seen as a viewer. Fixed at construction.
    this: Option<P>,
    /// Viewers added through [`ViewEngine::manual_add`].
    pub(crate) manual: ManualViewers<P>,
    /// Viewers that would be auto-visible but were removed explicitly.
    exceptions: HashSet<P, FxBuildHasher>,
    /// Candidate lists from the spatial index.
    pub(crate) references: Option<References<P>>,
}

impl<P: Viewer> ViewState<P> {
    pub(crate) fn is_self(&self, viewer: &P) -> bool {
        self.this.as_ref() == Some(viewer)
    }

    /// Whether an auto-view candidate is actually a viewer.
    pub(crate) fn is_auto_valid(&self, viewer: &P) -> bool {
        if self.is_self(viewer) {
            return false;
        }
        self.exceptions.is_empty() || !self.exceptions.contains(viewer)
    }

    /// Manual viewers in row order, minus the owner itself.
    pub(crate) fn manual_viewers(&self) -> impl Iterator<Item = &P> {
        self.manual.iter().filter(|viewer| !self.is_self(viewer))
    }

    /// Every candidate that passes the auto-view predicate, in reference order.
    pub(crate) fn auto_viewers(&self) -> impl Iterator<Item = &P> {
        self.references
            .iter()
            .flat_map(|lists| lists.iter())
            .filter(|list| !list.is_empty())
            .flat_map(|list| list.iter())
            .filter(|viewer| self.is_auto_valid(viewer))
    }
}

/// Decides which viewers can currently see one entity.
///
/// # Example
///
/// ```ignore
/// let engine = ViewEngine::new(Some(zombie.clone()));
///
/// // Once per tick, from the spatial index
/// engine.update_references(Some(index.viewers_around(zombie_chunk)));
///
/// // Hide the zombie from one nearby player
/// engine.manual_remove(alice);
///
/// for viewer in engine.as_set() {
///     viewer.send(&spawn_packet);
/// }
/// ```
pub struct ViewEngine<P> {
    owner: Option<Arc<dyn ViewOwner<P>>>,
    state: RwLock<ViewState<P>>,
}

impl<P: Viewer> ViewEngine<P> {
    /// Create the engine for `owner`.
    #[must_use]
    pub fn new(owner: Option<Arc<dyn ViewOwner<P>>>) -> Self {
        Self::with_capacity(owner, 0)
    }

    /// Create an engine that belongs to no entity.
    ///
    /// Nothing is excluded as "self" and viewers are never predictable.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(None)
    }

    /// Create the engine for `owner` with room for `manual_capacity` manual viewers.
    #[must_use]
    pub fn with_capacity(owner: Option<Arc<dyn ViewOwner<P>>>, manual_capacity: usize) -> Self {
        let this = owner.as_ref().and_then(|owner| owner.as_viewer());
        Self {
            owner,
            state: RwLock::new(ViewState {
                this,
                manual: ManualViewers::with_capacity(manual_capacity),
                exceptions: HashSet::default(),
                references: None,
            }),
        }
    }

    /// Replace the auto-view candidate lists.
    ///
    /// `None` means there are no auto-view candidates. The lists themselves are
    /// never modified here.
    pub fn update_references(&self, references: Option<References<P>>) {
        let lists = references.as_ref().map_or(0, |lists| lists.len());

        let previous = {
            let mut state = self.state.write();
            std::mem::replace(&mut state.references, references)
        };

        tracing::trace!(lists, "view references updated");
        // Superseded lists are released outside the lock
        drop(previous);
    }

    /// Add a manual viewer, clearing any exception for it.
    ///
    /// Returns `false` if `viewer` was already a manual viewer or is the
    /// owner itself, which never views its own entity.
    pub fn manual_add(&self, viewer: P) -> bool {
        let mut state = self.state.write();
        if state.is_self(&viewer) {
            return false;
        }
        state.exceptions.remove(&viewer);
        let added = state.manual.insert(viewer.clone());
        drop(state);

        tracing::trace!(?viewer, added, "manual viewer added");
        added
    }

    /// Remove a viewer.
    ///
    /// A manual viewer is simply dropped. Any other viewer is recorded as an
    /// exception so auto-view no longer shows the entity to it, even when it
    /// is not a candidate right now. Returns `false` only if that exception
    /// already existed.
    pub fn manual_remove(&self, viewer: P) -> bool {
        let mut state = self.state.write();
        if !state.manual.is_empty() && state.manual.remove(&viewer) {
            drop(state);
            tracing::trace!(?viewer, "manual viewer removed");
            return true;
        }

        let excluded = state.exceptions.insert(viewer.clone());
        drop(state);

        tracing::trace!(?viewer, excluded, "auto viewer excluded");
        excluded
    }

    /// Whether the viewers are exactly the entities whose own candidate lists
    /// contain this entity.
    ///
    /// True when the owner is auto-viewable and no manual viewers or
    /// exceptions exist. Callers can then skip building the viewer set.
    #[must_use]
    pub fn has_predictable_viewers(&self) -> bool {
        let Some(owner) = &self.owner else {
            return false;
        };

        if !owner.is_auto_viewable() {
            return false;
        }

        let state = self.state.read_recursive();
        state.manual.is_empty() && state.exceptions.is_empty()
    }

    /// Whether auto-view rules alone would accept `entity` as a viewer.
    ///
    /// Non-viewers cannot be excluded and always pass. Manual viewers return
    /// `false`: they bypass auto-view entirely.
    pub fn ensure_auto_viewer<'a>(&self, entity: impl Into<Subject<'a, P>>) -> bool {
        let Subject::Viewer(viewer) = entity.into() else {
            return true;
        };

        let state = self.state.read_recursive();
        if state.manual.contains(viewer) {
            return false;
        }
        state.is_auto_valid(viewer)
    }

    /// Whether `viewer` has been excluded from auto-view.
    #[must_use]
    pub fn is_excluded(&self, viewer: &P) -> bool {
        self.state.read_recursive().exceptions.contains(viewer)
    }

    /// Live, lazily computed view of the current viewers.
    #[must_use]
    pub fn as_set(&self) -> ViewSet<'_, P> {
        ViewSet::new(self)
    }

    pub(crate) fn state(&self) -> RwLockReadGuard<'_, ViewState<P>> {
        self.state.read_recursive()
    }
}

impl<P: Viewer> fmt::Debug for ViewEngine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read_recursive();
        f.debug_struct("ViewEngine")
            .field("this", &state.this)
            .field("manual", &state.manual.len())
            .field("exceptions", &state.exceptions.len())
            .field("lists", &state.references.as_ref().map(|lists| lists.len()))
            .finish_non_exhaustive()
    }
}
