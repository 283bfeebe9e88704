#![allow(clippy::redundant_pub_crate)]

//! RGB View - who can see an entity.
//!
//! Every entity owns a [`ViewEngine`] answering "which players currently see
//! me?" without keeping that set up to date eagerly.
//!
//! # Sources of viewers
//!
//! - **Manual viewers**: added with [`ViewEngine::manual_add`], always visible.
//! - **Auto viewers**: candidate lists from the spatial index (the players in
//!   surrounding chunks), handed over wholesale with
//!   [`ViewEngine::update_references`] and filtered lazily.
//! - **Exceptions**: auto viewers removed with [`ViewEngine::manual_remove`].
//!
//! ```text
//! viewers = manual ∪ { c ∈ references | c ≠ owner ∧ c ∉ exceptions }
//! ```
//!
//! # Reading
//!
//! [`ViewEngine::as_set`] returns a [`ViewSet`] whose methods walk the live
//! state under the engine lock. Use [`ViewSet::snapshot`] when a single
//! consistent copy is needed; iteration is only atomic per step.
//!
//! ```ignore
//! use rgb_view::ViewEngine;
//!
//! let engine = ViewEngine::new(Some(owner));
//! engine.update_references(Some(spatial.viewers_near(chunk)));
//!
//! if engine.has_predictable_viewers() {
//!     // Broadcast through the chunk lists directly
//! } else {
//!     engine.as_set().for_each(|player| player.send(&packet));
//! }
//! ```

mod engine;
mod iter;
mod manual;
mod owner;
mod set;

pub use engine::ViewEngine;
pub use iter::ViewIter;
pub use owner::{References, Subject, ViewOwner, Viewer, ViewerList};
pub use set::ViewSet;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{References, Subject, ViewEngine, ViewOwner, ViewSet, Viewer, ViewerList};
}
