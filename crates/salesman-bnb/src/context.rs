// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Shared search context.
//!
//! `SearchContext` bundles everything the workers of one search share: the
//! graph, the queue of pending partial tours, the best bound and the stop
//! flag. It is created by the orchestrator, borrowed by every scoped worker
//! thread and dropped after they joined, so it needs no reference counting.

use salesman_model::{graph::Graph, index::NodeIndex, path::PathState};
use salesman_search::bound::BestBound;
use salesman_sync::queue::ConcurrentQueue;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct SearchContext<'g> {
    graph: &'g Graph,
    queue: ConcurrentQueue<PathState<'g>>,
    bound: BestBound<'g>,
    stop: AtomicBool,
    depth_threshold: usize,
    pruning: bool,
}

impl<'g> SearchContext<'g> {
    /// Creates a context with an empty queue and bound.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `depth_threshold` is not in `1..=graph.size()`.
    pub fn new(graph: &'g Graph, depth_threshold: usize, pruning: bool) -> Self {
        debug_assert!(
            (1..=graph.size()).contains(&depth_threshold),
            "called `SearchContext::new` with depth threshold out of bounds: the size is {} but the threshold is {}",
            graph.size(),
            depth_threshold
        );
        Self {
            graph,
            queue: ConcurrentQueue::new(),
            bound: BestBound::new(),
            stop: AtomicBool::new(false),
            depth_threshold,
            pruning,
        }
    }

    #[inline(always)]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    #[inline(always)]
    pub fn queue(&self) -> &ConcurrentQueue<PathState<'g>> {
        &self.queue
    }

    #[inline(always)]
    pub fn bound(&self) -> &BestBound<'g> {
        &self.bound
    }

    /// Partial tours with fewer nodes than this are split onto the queue.
    #[inline(always)]
    pub fn depth_threshold(&self) -> usize {
        self.depth_threshold
    }

    #[inline(always)]
    pub fn pruning(&self) -> bool {
        self.pruning
    }

    /// Returns `true` if `path` cannot lead to a tour shorter than the best one.
    #[inline(always)]
    pub fn should_prune(&self, path: &PathState<'g>) -> bool {
        self.pruning && path.total_distance() >= self.bound.current_length()
    }

    /// Asks every worker to finish.
    #[inline]
    pub fn raise_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Fills the queue with the initial frontier and returns its size.
    ///
    /// Starting from `[0]`, the frontier is expanded one level at a time until
    /// it holds at least `target` states or its states reach the depth
    /// threshold. This runs on the calling thread before any worker starts,
    /// so no worker can observe an empty queue while seeding is incomplete.
    pub fn seed(&self, target: usize) -> usize {
        let mut root = PathState::new(self.graph);
        root.add(NodeIndex::new(0));

        let mut frontier = vec![root];
        while frontier.len() < target
            && frontier
                .first()
                .is_some_and(|path| path.len() < self.depth_threshold && !path.leaf())
        {
            frontier = frontier
                .iter()
                .flat_map(|parent| children(parent))
                .collect();
        }

        let seeded = frontier.len();
        for path in frontier {
            self.queue.enqueue(path);
        }
        seeded
    }

    /// Returns a copy of the best tour found so far.
    #[inline]
    pub fn best(&self) -> Option<PathState<'g>> {
        self.bound.best()
    }
}

/// Iterates over the one-node extensions of `parent` by unvisited nodes other
/// than the start.
pub(crate) fn children<'p, 'g>(
    parent: &'p PathState<'g>,
) -> impl Iterator<Item = PathState<'g>> + 'p {
    parent
        .graph()
        .nodes()
        .skip(1)
        .filter(move |&node| !parent.contains(node))
        .map(move |node| {
            let mut child = parent.clone();
            child.add(node);
            child
        })
}

impl std::fmt::Debug for SearchContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("nodes", &self.graph.size())
            .field("queue", &self.queue)
            .field("bound", &self.bound)
            .field("stopped", &self.is_stopped())
            .field("depth_threshold", &self.depth_threshold)
            .field("pruning", &self.pruning)
            .finish()
    }
}
