use std::convert::Infallible;
use std::future::Future;

use super::event::{TraversalEvent, TraversalOptions, TraversalResult};
use super::walk::Walk;
use crate::config::Config;
use crate::opml::{Opml, Outline};

type Filter<'a, S, E> = Box<dyn Fn(&TraversalEvent<'a, S>) -> Result<bool, E> + 'a>;

/// Error raised by a predicate set with [`Traverser::try_filter`].
///
/// Walks unwrap it before handing it back, so callers see their own error
/// type. The wrapper only keeps fallible traversers apart from infallible ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFailed<E>(pub E);

/// Converts a traverser's filter error into the visitor's error type.
///
/// Implemented for [`Infallible`] (any visitor error works) and for
/// [`FilterFailed<E>`] (the visitor must fail with the same `E`).
pub trait FilterError<V> {
    fn into_visit_error(self) -> V;
}

impl<V> FilterError<V> for Infallible {
    fn into_visit_error(self) -> V {
        match self {}
    }
}

impl<E> FilterError<E> for FilterFailed<E> {
    fn into_visit_error(self) -> E {
        self.0
    }
}

/// Walks outline trees and reports a [`TraversalEvent`] per node.
///
/// A traverser is configured once and can run any number of walks. The
/// optional filter decides which events reach the visitor and the result; it
/// never stops the walk from descending into a rejected node's children. A
/// filter set with [`try_filter`](Self::try_filter) can also fail, which
/// aborts the walk like a visitor error.
///
/// ```
/// use opml_core::opml::Outline;
/// use opml_core::traverse::{TraversalOptions, Traverser};
///
/// let root = Outline::new("Root").with_child(Outline::new("Child"));
/// let mut paths = Vec::new();
/// Traverser::new(TraversalOptions::default()).visit(&root, |event| {
///     paths.push(event.path.clone());
/// });
/// assert_eq!(paths, ["Root", "Root/Child"]);
/// ```
pub struct Traverser<'a, S: ?Sized = (), E = Infallible> {
    options: TraversalOptions,
    state: &'a S,
    filter: Option<Filter<'a, S, E>>,
}

impl<'a> Traverser<'a, ()> {
    pub fn new(options: TraversalOptions) -> Self {
        Self {
            options,
            state: &(),
            filter: None,
        }
    }

    /// Uses the `[traversal]` settings of a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.traversal.clone())
    }
}

impl<'a, S: ?Sized> Traverser<'a, S> {
    /// Creates a traverser whose events all carry `state`.
    pub fn with_state(options: TraversalOptions, state: &'a S) -> Self {
        Self {
            options,
            state,
            filter: None,
        }
    }

    /// [`traverse`](Self::traverse) for visitors that cannot fail.
    pub fn visit<F>(&self, root: &'a Outline, mut visitor: F) -> TraversalResult<'a>
    where
        F: FnMut(&TraversalEvent<'a, S>),
    {
        let result = self.traverse(root, |event| {
            visitor(event);
            Ok::<(), Infallible>(())
        });
        match result {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// [`traverse_document`](Self::traverse_document) for visitors that cannot fail.
    pub fn visit_document<F>(&self, opml: &'a Opml, mut visitor: F) -> TraversalResult<'a>
    where
        F: FnMut(&TraversalEvent<'a, S>),
    {
        let result = self.traverse_document(opml, |event| {
            visitor(event);
            Ok::<(), Infallible>(())
        });
        match result {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }
}

impl<'a, S: ?Sized, E> Traverser<'a, S, E> {
    /// Sets the inclusion predicate, replacing any previous one.
    pub fn filter(mut self, predicate: impl Fn(&TraversalEvent<'a, S>) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(move |event: &TraversalEvent<'a, S>| {
            Ok::<bool, E>(predicate(event))
        }));
        self
    }

    /// Sets a predicate that can fail, replacing any previous one.
    ///
    /// The first `Err` stops the walk. `traverse` and its variants return it
    /// unchanged, and the iterators yield it once and then end.
    pub fn try_filter<X>(
        self,
        predicate: impl Fn(&TraversalEvent<'a, S>) -> Result<bool, X> + 'a,
    ) -> Traverser<'a, S, FilterFailed<X>> {
        Traverser {
            options: self.options,
            state: self.state,
            filter: Some(Box::new(move |event: &TraversalEvent<'a, S>| {
                predicate(event).map_err(FilterFailed)
            })),
        }
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    /// Walks `root` and its descendants, calling `visitor` for each accepted
    /// event. The first visitor or filter error aborts the walk and is
    /// returned as is.
    pub fn traverse<F, V>(&self, root: &'a Outline, visitor: F) -> Result<TraversalResult<'a>, V>
    where
        F: FnMut(&TraversalEvent<'a, S>) -> Result<(), V>,
        E: FilterError<V>,
    {
        self.run(std::slice::from_ref(root), visitor)
    }

    /// Walks every top-level outline of `opml` in body order, each one to
    /// completion before the next. Roots see the whole body as their siblings.
    pub fn traverse_document<F, V>(
        &self,
        opml: &'a Opml,
        visitor: F,
    ) -> Result<TraversalResult<'a>, V>
    where
        F: FnMut(&TraversalEvent<'a, S>) -> Result<(), V>,
        E: FilterError<V>,
    {
        self.run(&opml.body.outlines, visitor)
    }

    /// Async variant of [`traverse`](Self::traverse).
    ///
    /// Each visitor future is awaited before the next node is produced, so
    /// visitors observe exactly the synchronous order.
    pub async fn traverse_async<F, Fut, V>(
        &self,
        root: &'a Outline,
        visitor: F,
    ) -> Result<TraversalResult<'a>, V>
    where
        F: FnMut(TraversalEvent<'a, S>) -> Fut,
        Fut: Future<Output = Result<(), V>>,
        E: FilterError<V>,
    {
        self.run_async(std::slice::from_ref(root), visitor).await
    }

    /// Async variant of [`traverse_document`](Self::traverse_document).
    pub async fn traverse_document_async<F, Fut, V>(
        &self,
        opml: &'a Opml,
        visitor: F,
    ) -> Result<TraversalResult<'a>, V>
    where
        F: FnMut(TraversalEvent<'a, S>) -> Fut,
        Fut: Future<Output = Result<(), V>>,
        E: FilterError<V>,
    {
        self.run_async(&opml.body.outlines, visitor).await
    }

    /// Lazily yields accepted events for `root` and its descendants.
    ///
    /// Each call starts a fresh walk. With a fallible filter the items are
    /// `Result`s.
    pub fn events(&self, root: &'a Outline) -> Events<'_, 'a, S, E> {
        self.events_over(std::slice::from_ref(root))
    }

    /// Lazily yields accepted events for every top-level outline of `opml`.
    pub fn events_document(&self, opml: &'a Opml) -> Events<'_, 'a, S, E> {
        self.events_over(&opml.body.outlines)
    }

    /// Lazily yields accepted outlines for `root` and its descendants.
    pub fn iter(&self, root: &'a Outline) -> Nodes<'_, 'a, S, E> {
        Nodes {
            events: self.events(root),
        }
    }

    /// Lazily yields accepted outlines for every top-level outline of `opml`.
    pub fn iter_document(&self, opml: &'a Opml) -> Nodes<'_, 'a, S, E> {
        Nodes {
            events: self.events_document(opml),
        }
    }

    fn events_over(&self, roots: &'a [Outline]) -> Events<'_, 'a, S, E> {
        Events {
            walk: Walk::new(roots, self.options.strategy, &self.options.path_delimiter),
            traverser: self,
            failed: false,
        }
    }

    fn accepts(&self, event: &TraversalEvent<'a, S>) -> Result<bool, E> {
        match &self.filter {
            Some(filter) => filter(event),
            None => Ok(true),
        }
    }

    fn run<F, V>(&self, roots: &'a [Outline], mut visitor: F) -> Result<TraversalResult<'a>, V>
    where
        F: FnMut(&TraversalEvent<'a, S>) -> Result<(), V>,
        E: FilterError<V>,
    {
        let mut result = TraversalResult::default();
        let mut events = self.events_over(roots);
        while let Some(accepted) = events.next_accepted() {
            let event = match accepted {
                Ok(event) => event,
                Err(e) => return Err(<E as FilterError<V>>::into_visit_error(e)),
            };
            visitor(&event)?;
            result.record(event.node, event.depth);
        }
        tracing::debug!(
            nodes = result.node_count,
            max_depth = result.max_depth,
            "Traversal complete"
        );
        Ok(result)
    }

    async fn run_async<F, Fut, V>(
        &self,
        roots: &'a [Outline],
        mut visitor: F,
    ) -> Result<TraversalResult<'a>, V>
    where
        F: FnMut(TraversalEvent<'a, S>) -> Fut,
        Fut: Future<Output = Result<(), V>>,
        E: FilterError<V>,
    {
        let mut result = TraversalResult::default();
        let mut events = self.events_over(roots);
        while let Some(accepted) = events.next_accepted() {
            let event = match accepted {
                Ok(event) => event,
                Err(e) => return Err(<E as FilterError<V>>::into_visit_error(e)),
            };
            let (node, depth) = (event.node, event.depth);
            visitor(event).await?;
            result.record(node, depth);
        }
        tracing::debug!(
            nodes = result.node_count,
            max_depth = result.max_depth,
            "Async traversal complete"
        );
        Ok(result)
    }
}

/// Iterator over accepted [`TraversalEvent`]s, from [`Traverser::events`].
///
/// Yields events directly, or `Result`s when the traverser has a fallible
/// filter. After a filter error it yields nothing more.
pub struct Events<'t, 'a, S: ?Sized, E = Infallible> {
    walk: Walk<'a>,
    traverser: &'t Traverser<'a, S, E>,
    failed: bool,
}

impl<'a, S: ?Sized, E> Events<'_, 'a, S, E> {
    fn next_accepted(&mut self) -> Option<Result<TraversalEvent<'a, S>, E>> {
        if self.failed {
            return None;
        }
        loop {
            let event = self.walk.next()?.into_event(self.traverser.state);
            match self.traverser.accepts(&event) {
                Ok(true) => return Some(Ok(event)),
                Ok(false) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<'a, S: ?Sized> Iterator for Events<'_, 'a, S> {
    type Item = TraversalEvent<'a, S>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_accepted()? {
            Ok(event) => Some(event),
            Err(never) => match never {},
        }
    }
}

impl<'a, S: ?Sized, X> Iterator for Events<'_, 'a, S, FilterFailed<X>> {
    type Item = Result<TraversalEvent<'a, S>, X>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_accepted()?.map_err(|FilterFailed(e)| e))
    }
}

/// Iterator over accepted outlines, from [`Traverser::iter`].
pub struct Nodes<'t, 'a, S: ?Sized, E = Infallible> {
    events: Events<'t, 'a, S, E>,
}

impl<'a, S: ?Sized> Iterator for Nodes<'_, 'a, S> {
    type Item = &'a Outline;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.next().map(|event| event.node)
    }
}

impl<'a, S: ?Sized, X> Iterator for Nodes<'_, 'a, S, FilterFailed<X>> {
    type Item = Result<&'a Outline, X>;

    fn next(&mut self) -> Option<Self::Item> {
        self.events
            .next()
            .map(|event| event.map(|event| event.node))
    }
}
