//! Read-only walks over outline trees.
//!
//! A [`Traverser`] visits a single [`Outline`](crate::opml::Outline) subtree or
//! every top-level outline of an [`Opml`](crate::opml::Opml) document, depth
//! first or breadth first. Visitors can be synchronous, asynchronous, or
//! replaced by pulling events from an iterator; all three share one walk.

mod event;
mod traverser;
mod walk;

pub use event::{TraversalEvent, TraversalOptions, TraversalResult, TraversalStrategy};
pub use traverser::{Events, FilterError, FilterFailed, Nodes, Traverser};
