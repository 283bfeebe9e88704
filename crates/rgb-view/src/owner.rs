//! Collaborator boundary: the owning entity and the candidate lists handed in
//! by the spatial index.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Identity of an entity that can observe other entities (a player).
///
/// Anything cheap to clone and compare works: a raw entity id, an
/// `Arc<Player>`, a connection handle.
pub trait Viewer: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Viewer for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// One candidate list, usually every viewer inside a single chunk.
///
/// Owned by the spatial index and replaced (never edited in place) when the
/// chunk's population changes.
pub type ViewerList<P> = Arc<[P]>;

/// All candidate lists surrounding an entity, in the order the spatial index
/// wants them visited.
pub type References<P> = Arc<[ViewerList<P>]>;

/// The entity a [`ViewEngine`](crate::ViewEngine) belongs to.
pub trait ViewOwner<P>: Send + Sync {
    /// Whether nearby viewers see this entity without being added manually.
    ///
    /// Queried on every call to
    /// [`has_predictable_viewers`](crate::ViewEngine::has_predictable_viewers),
    /// so it may change over the entity's lifetime.
    fn is_auto_viewable(&self) -> bool;

    /// This entity as a viewer, if it is one.
    ///
    /// Read once when the engine is built and used to keep an entity out of
    /// its own viewer set.
    fn as_viewer(&self) -> Option<P>;
}

/// An entity checked against auto-view rules.
///
/// Only viewers can be excluded from auto-view; everything else is always
/// treated as visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject<'a, P> {
    /// An entity able to observe others.
    Viewer(&'a P),
    /// An entity that can only be observed (item, mob, projectile).
    Other,
}

impl<'a, P> From<&'a P> for Subject<'a, P> {
    fn from(viewer: &'a P) -> Self {
        Self::Viewer(viewer)
    }
}

impl<'a, P> From<Option<&'a P>> for Subject<'a, P> {
    fn from(viewer: Option<&'a P>) -> Self {
        viewer.map_or(Self::Other, Self::Viewer)
    }
}
