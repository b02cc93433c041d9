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

//! # Partial Tours
//!
//! `PathState` is the unit of work of the search: an ordered prefix of a tour
//! rooted at node 0, its running length, and a visited bitset. It borrows the
//! `Graph` it walks on, so a state can never be combined with distances from a
//! different instance.
//!
//! ## Invariants
//!
//! - `sequence` holds at most `n + 1` nodes and no duplicates, except that the
//!   first node may reappear once as the closing node.
//! - bit `k` of `visited` is set iff `k` appears in `sequence`.
//! - `total_distance` is the sum of the edge lengths between consecutive nodes.
//!
//! `add` followed by `pop` restores all three exactly, which is what allows the
//! deep part of the search to backtrack in place instead of cloning.
//!
//! ## Usage
//!
//! ```rust
//! use salesman_model::{graph::Graph, index::NodeIndex, path::PathState};
//!
//! let graph = Graph::from_edges(3, &[(0, 1, 4), (1, 2, 5), (0, 2, 6)]).unwrap();
//! let mut path = PathState::new(&graph);
//! path.add(NodeIndex::new(0));
//! path.add(NodeIndex::new(1));
//! path.add(NodeIndex::new(2));
//! assert!(path.leaf());
//! assert_eq!(path.total_distance(), 9);
//!
//! path.add(NodeIndex::new(0));
//! assert!(path.is_closed());
//! assert_eq!(path.to_string(), "[15: 0, 1, 2, 0]");
//! ```

use crate::{graph::Graph, index::NodeIndex, tour::Tour};
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

/// Inline capacity of the node sequence. Instances of up to 23 nodes keep
/// their whole closed tour on the stack.
const INLINE_NODES: usize = 24;

/// A partial tour over a borrowed `Graph`.
#[derive(Clone)]
pub struct PathState<'g> {
    graph: &'g Graph,
    sequence: SmallVec<[NodeIndex; INLINE_NODES]>,
    total_distance: u64,
    visited: FixedBitSet,
}

impl<'g> PathState<'g> {
    /// Creates an empty path on `graph`.
    #[inline]
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            sequence: SmallVec::new(),
            total_distance: 0,
            visited: FixedBitSet::with_capacity(graph.size()),
        }
    }

    /// Returns the graph this path walks on.
    #[inline(always)]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Appends `node`, accumulating the distance from the current last node.
    ///
    /// A path already holding `n + 1` nodes is full and the call is ignored.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `node` is out of bounds, or if it is already
    /// on the path and is not the first node closing a full path.
    #[inline]
    pub fn add(&mut self, node: NodeIndex) {
        debug_assert!(
            node.get() < self.graph.size(),
            "called `PathState::add` with node index out of bounds: the len is {} but the index is {}",
            self.graph.size(),
            node.get()
        );

        if self.sequence.len() > self.graph.size() {
            return;
        }
        debug_assert!(
            !self.visited.contains(node.get())
                || (self.leaf() && self.sequence.first() == Some(&node)),
            "called `PathState::add` with node {} that is already on the path {}",
            node.get(),
            self
        );
        if let Some(&last) = self.sequence.last() {
            // At most `n` edges, each bounded by `max_edge_distance(n)`.
            self.total_distance += self.graph.distance(last, node);
        }
        self.sequence.push(node);
        self.visited.insert(node.get());
    }

    /// Removes and returns the last node, undoing its distance and visited bit.
    ///
    /// Popping the closing node of a tour keeps the start node marked as
    /// visited, since it is still the first entry of the sequence.
    #[inline]
    pub fn pop(&mut self) -> Option<NodeIndex> {
        let node = self.sequence.pop()?;
        if let Some(&previous) = self.sequence.last() {
            self.total_distance -= self.graph.distance(previous, node);
        }
        if self.sequence.first() != Some(&node) {
            self.visited.set(node.get(), false);
        }
        Some(node)
    }

    /// Returns `true` if `node` has been visited.
    #[inline(always)]
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.visited.contains(node.get())
    }

    /// Returns `true` if every node has been visited once and only the return
    /// to the start is missing.
    #[inline(always)]
    pub fn leaf(&self) -> bool {
        self.sequence.len() == self.graph.size()
    }

    /// Returns `true` if the path is a complete tour ending where it started.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.sequence.len() == self.graph.size() + 1 && self.sequence.first() == self.sequence.last()
    }

    /// Returns the number of nodes in the sequence.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` if the path has no nodes.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Returns the largest number of nodes the path can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.graph.size() + 1
    }

    /// Returns the first node, if any.
    #[inline]
    pub fn first(&self) -> Option<NodeIndex> {
        self.sequence.first().copied()
    }

    /// Returns the last node, if any.
    #[inline]
    pub fn last(&self) -> Option<NodeIndex> {
        self.sequence.last().copied()
    }

    /// Returns the sum of the edge lengths along the sequence.
    #[inline(always)]
    pub fn total_distance(&self) -> u64 {
        self.total_distance
    }

    /// Returns the node sequence.
    #[inline]
    pub fn sequence(&self) -> &[NodeIndex] {
        &self.sequence
    }

    /// Copies the path into an owned `Tour`.
    #[inline]
    pub fn to_tour(&self) -> Tour {
        Tour::new(self.sequence.to_vec(), self.total_distance)
    }
}

impl std::fmt::Debug for PathState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathState")
            .field("sequence", &self.sequence)
            .field("total_distance", &self.total_distance)
            .field("visited", &self.visited.ones().collect::<Vec<_>>())
            .finish()
    }
}

impl std::fmt::Display for PathState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.total_distance)?;
        for (i, node) in self.sequence.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{}", sep, node.get())?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn four_nodes() -> Graph {
        Graph::from_edges(
            4,
            &[
                (0, 1, 10),
                (0, 2, 15),
                (0, 3, 20),
                (1, 2, 35),
                (1, 3, 25),
                (2, 3, 30),
            ],
        )
        .expect("valid graph")
    }

    #[test]
    fn test_new_path_is_empty() {
        let g = four_nodes();
        let p = PathState::new(&g);
        assert!(p.is_empty());
        assert_eq!(p.total_distance(), 0);
        assert_eq!(p.first(), None);
        assert_eq!(p.capacity(), 5);
        assert!(g.nodes().all(|i| !p.contains(i)));
        assert_eq!(p.to_string(), "[0]");
    }

    #[test]
    fn test_add_accumulates_distances() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        p.add(n(0));
        assert_eq!(p.total_distance(), 0);
        p.add(n(1));
        p.add(n(3));
        assert_eq!(p.total_distance(), 35);
        assert!(p.contains(n(3)));
        assert!(!p.contains(n(2)));
        assert!(!p.leaf());
        p.add(n(2));
        assert!(p.leaf());
        assert!(!p.is_closed());
        p.add(n(0));
        assert!(p.is_closed());
        assert_eq!(p.total_distance(), 80);
        assert_eq!(p.to_string(), "[80: 0, 1, 3, 2, 0]");
    }

    #[test]
    fn test_add_beyond_capacity_is_ignored() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        for i in [0, 1, 2, 3, 0] {
            p.add(n(i));
        }
        let before = p.clone();
        p.add(n(1));
        assert_eq!(p.len(), 5);
        assert_eq!(p.total_distance(), before.total_distance());
        assert_eq!(p.sequence(), before.sequence());
    }

    #[test]
    fn test_popping_closing_node_keeps_start_visited() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        for i in [0, 1, 3, 2, 0] {
            p.add(n(i));
        }
        assert_eq!(p.pop(), Some(n(0)));
        assert!(p.contains(n(0)));
        assert_eq!(p.total_distance(), 65);
        assert_eq!(p.pop(), Some(n(2)));
        assert!(!p.contains(n(2)));
        assert_eq!(p.total_distance(), 35);
    }

    #[test]
    fn test_closing_with_the_start_node_is_allowed() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        for i in [0, 2, 1, 3] {
            p.add(n(i));
        }
        p.add(n(0));
        assert!(p.is_closed());
        assert_eq!(p.len(), 5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already on the path")]
    fn test_revisiting_a_node_panics_in_debug_builds() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        p.add(n(0));
        p.add(n(1));
        p.add(n(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already on the path")]
    fn test_returning_to_start_early_panics_in_debug_builds() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        p.add(n(0));
        p.add(n(1));
        p.add(n(0));
    }

    #[test]
    fn test_largest_admissible_distances_do_not_overflow() {
        let max = crate::graph::max_edge_distance(4);
        let distances = (0..16).map(|k| if k % 5 == 0 { 0 } else { max }).collect();
        let g = Graph::from_matrix(4, distances).unwrap();
        let mut p = PathState::new(&g);
        for i in [0, 1, 2, 3, 0] {
            p.add(n(i));
        }
        assert_eq!(p.total_distance(), 4 * max);
        assert!(p.total_distance() < u64::MAX);
        while p.pop().is_some() {}
        assert_eq!(p.total_distance(), 0);
    }

    #[test]
    fn test_pop_on_empty_returns_none() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        assert_eq!(p.pop(), None);
        p.add(n(2));
        assert_eq!(p.pop(), Some(n(2)));
        assert!(!p.contains(n(2)));
        assert_eq!(p.pop(), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let g = four_nodes();
        let mut parent = PathState::new(&g);
        parent.add(n(0));
        parent.add(n(1));
        let mut child = parent.clone();
        child.add(n(2));
        assert_eq!(parent.len(), 2);
        assert!(!parent.contains(n(2)));
        assert_eq!(child.total_distance(), 45);
    }

    #[test]
    fn test_to_tour_copies_sequence_and_length() {
        let g = four_nodes();
        let mut p = PathState::new(&g);
        for i in [0, 2, 3, 1, 0] {
            p.add(n(i));
        }
        let tour = p.to_tour();
        assert_eq!(tour.length(), 80);
        assert_eq!(tour.nodes(), p.sequence());
    }

    proptest! {
        #[test]
        fn prop_add_then_pop_restores_empty_state(
            size in 2usize..12,
            seed in any::<u64>(),
            keys in proptest::collection::vec(any::<u32>(), 12),
        ) {
            let g = Graph::random_euclidean(size, seed);
            let mut order: Vec<usize> = (1..size).collect();
            order.sort_by_key(|&i| keys[i]);

            let mut p = PathState::new(&g);
            p.add(n(0));
            let mut expected = 0;
            let mut last = n(0);
            for &i in &order {
                p.add(n(i));
                expected += g.distance(last, n(i));
                last = n(i);
                prop_assert_eq!(p.total_distance(), expected);
            }
            prop_assert!(p.leaf());
            p.add(n(0));
            prop_assert!(p.is_closed());

            while p.pop().is_some() {}
            prop_assert_eq!(p.total_distance(), 0);
            prop_assert!(p.is_empty());
            prop_assert!(g.nodes().all(|i| !p.contains(i)));
        }
    }
}
