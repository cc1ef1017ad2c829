use std::fmt;

use serde::Deserialize;

use crate::opml::Outline;

/// Order in which a walk visits outlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalStrategy {
    /// Pre-order: a node, then each child's whole subtree left to right.
    #[default]
    DepthFirst,
    /// Level order: every node at depth `d` before any node at depth `d + 1`.
    BreadthFirst,
}

/// Walk settings, also readable from the `[traversal]` config table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraversalOptions {
    pub strategy: TraversalStrategy,
    /// Separator placed between ancestor texts in [`TraversalEvent::path`].
    pub path_delimiter: String,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            strategy: TraversalStrategy::DepthFirst,
            path_delimiter: "/".to_string(),
        }
    }
}

/// Context handed to a visitor for one outline.
///
/// Everything borrows from the tree being walked, so events are cheap to
/// produce and can be kept for as long as the tree lives.
pub struct TraversalEvent<'a, S: ?Sized = ()> {
    pub node: &'a Outline,
    /// Zero for the outline a walk starts from.
    pub depth: usize,
    /// Ancestor texts and the node's own text, joined by the delimiter.
    pub path: String,
    /// `None` for roots.
    pub parent: Option<&'a Outline>,
    /// Position of `node` within `siblings`.
    pub sibling_index: usize,
    pub siblings: &'a [Outline],
    /// Caller state, the same reference for every event of a walk.
    pub state: &'a S,
}

// Derive would require `S: Clone`, which an unsized state cannot satisfy.
impl<S: ?Sized> Clone for TraversalEvent<'_, S> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            depth: self.depth,
            path: self.path.clone(),
            parent: self.parent,
            sibling_index: self.sibling_index,
            siblings: self.siblings,
            state: self.state,
        }
    }
}

impl<S: ?Sized + fmt::Debug> fmt::Debug for TraversalEvent<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalEvent")
            .field("text", &self.node.text)
            .field("depth", &self.depth)
            .field("path", &self.path)
            .field("parent", &self.parent.map(|p| &p.text))
            .field("sibling_index", &self.sibling_index)
            .field("siblings", &self.siblings.len())
            .field("state", &self.state)
            .finish()
    }
}

/// Summary of a completed walk. Only events accepted by the filter count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalResult<'a> {
    pub node_count: usize,
    /// Deepest accepted depth; zero when nothing was visited.
    pub max_depth: usize,
    /// Accepted outlines in visitation order.
    pub visited: Vec<&'a Outline>,
}

impl<'a> TraversalResult<'a> {
    pub(crate) fn record(&mut self, node: &'a Outline, depth: usize) {
        self.node_count += 1;
        self.max_depth = self.max_depth.max(depth);
        self.visited.push(node);
    }
}
