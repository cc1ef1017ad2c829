use std::collections::VecDeque;
use std::sync::Arc;

use super::event::{TraversalEvent, TraversalStrategy};
use crate::opml::Outline;

/// A node waiting to be visited, with everything needed to build its event.
struct Frame<'a> {
    node: &'a Outline,
    depth: usize,
    parent: Option<&'a Outline>,
    /// Path of the parent, shared by all siblings; empty for roots.
    parent_path: Arc<str>,
    sibling_index: usize,
    siblings: &'a [Outline],
}

/// One visited node, before caller state is attached.
pub(crate) struct Step<'a> {
    node: &'a Outline,
    depth: usize,
    path: Arc<str>,
    parent: Option<&'a Outline>,
    sibling_index: usize,
    siblings: &'a [Outline],
}

impl<'a> Step<'a> {
    pub(crate) fn into_event<S: ?Sized>(self, state: &'a S) -> TraversalEvent<'a, S> {
        TraversalEvent {
            node: self.node,
            depth: self.depth,
            path: self.path.to_string(),
            parent: self.parent,
            sibling_index: self.sibling_index,
            siblings: self.siblings,
            state,
        }
    }
}

/// Iterative walk over a slice of roots.
///
/// The frontier is used as a stack for depth-first and as a queue for
/// breadth-first order. Roots are fed in one at a time, and only once the
/// previous root's subtree is exhausted, so both strategies finish one
/// top-level outline before starting the next.
pub(crate) struct Walk<'a> {
    strategy: TraversalStrategy,
    delimiter: String,
    roots: &'a [Outline],
    next_root: usize,
    frontier: VecDeque<Frame<'a>>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(roots: &'a [Outline], strategy: TraversalStrategy, delimiter: &str) -> Self {
        Self {
            strategy,
            delimiter: delimiter.to_string(),
            roots,
            next_root: 0,
            frontier: VecDeque::new(),
        }
    }

    fn push_children(&mut self, node: &'a Outline, depth: usize, path: &Arc<str>) {
        let frames = node
            .outlines
            .iter()
            .enumerate()
            .map(|(index, child)| Frame {
                node: child,
                depth: depth + 1,
                parent: Some(node),
                parent_path: Arc::clone(path),
                sibling_index: index,
                siblings: &node.outlines,
            });

        match self.strategy {
            // Reversed so the first child is popped first.
            TraversalStrategy::DepthFirst => {
                let frames: Vec<_> = frames.collect();
                self.frontier.extend(frames.into_iter().rev());
            }
            TraversalStrategy::BreadthFirst => self.frontier.extend(frames),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Step<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frontier.is_empty() {
            let root = self.roots.get(self.next_root)?;
            self.frontier.push_back(Frame {
                node: root,
                depth: 0,
                parent: None,
                parent_path: Arc::from(""),
                sibling_index: self.next_root,
                siblings: self.roots,
            });
            self.next_root += 1;
        }

        let frame = match self.strategy {
            TraversalStrategy::DepthFirst => self.frontier.pop_back(),
            TraversalStrategy::BreadthFirst => self.frontier.pop_front(),
        }?;

        let text = frame.node.text_or_empty();
        let path: Arc<str> = if frame.parent_path.is_empty() {
            Arc::from(text)
        } else {
            Arc::from(format!("{}{}{}", frame.parent_path, self.delimiter, text))
        };

        self.push_children(frame.node, frame.depth, &path);

        Some(Step {
            node: frame.node,
            depth: frame.depth,
            path,
            parent: frame.parent,
            sibling_index: frame.sibling_index,
            siblings: frame.siblings,
        })
    }
}
