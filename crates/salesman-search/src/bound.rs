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

//! # Shared Best Bound
//!
//! `BestBound` holds the shortest closed tour any worker has found so far. All
//! workers read its length as their pruning threshold and offer every closed
//! tour they build through `try_improve`.
//!
//! ## Motivation
//!
//! - Tour and length are one unit: the length is read from the tour the cell
//!   currently references, so a reader can never pair the length of one update
//!   with the tour of another.
//! - No locks: installs are a stamped compare-and-swap retry loop. A failed
//!   CAS means another worker installed something in the meantime; the loop
//!   re-reads and only retries while the candidate is still strictly shorter.
//! - Monotonic: the length never increases and no improvement is lost.
//!
//! ## Storage
//!
//! Installed tours live in a `SlotTable` owned by the bound and are only freed
//! when the bound is dropped, so a reader holding an older reference always
//! dereferences a fully written, still allocated tour. A candidate is copied
//! into the table at most once per call, and only after it has beaten the
//! current length.
//!
//! ## Usage
//!
//! ```rust
//! use salesman_model::{graph::Graph, index::NodeIndex, path::PathState};
//! use salesman_search::bound::BestBound;
//!
//! let graph = Graph::from_edges(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 1)]).unwrap();
//! let bound = BestBound::new();
//! assert_eq!(bound.current_length(), u64::MAX);
//!
//! let mut tour = PathState::new(&graph);
//! for i in [0, 1, 2, 0] {
//!     tour.add(NodeIndex::new(i));
//! }
//! assert!(bound.try_improve(&tour));
//! assert_eq!(bound.current_length(), 3);
//! assert!(!bound.try_improve(&tour));
//! ```

use salesman_model::{path::PathState, tour::Tour};
use salesman_sync::{
    slot::{SlotRef, SlotTable},
    stamped::StampedCell,
};

/// The best tour found so far, shared by all search workers.
pub struct BestBound<'g> {
    tours: SlotTable<PathState<'g>>,
    best: StampedCell<PathState<'g>>,
}

impl Default for BestBound<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'g> BestBound<'g> {
    /// Creates an empty bound. Its length is `u64::MAX` until the first install.
    #[inline]
    pub fn new() -> Self {
        Self {
            tours: SlotTable::new(),
            best: StampedCell::new(),
        }
    }

    #[inline(always)]
    fn tour(&self, slot: SlotRef<PathState<'g>>) -> &PathState<'g> {
        // SAFETY: every reference stored in `best` was returned by
        // `self.tours.insert`, which finishes writing the slot before it
        // returns. The slot is published by the release CAS in `try_improve`
        // and observed through an acquire load, and it stays allocated until
        // `self` is dropped.
        unsafe { self.tours.get(slot) }
    }

    #[inline(always)]
    fn length_of(&self, slot: Option<SlotRef<PathState<'g>>>) -> u64 {
        match slot {
            Some(slot) => self.tour(slot).total_distance(),
            None => u64::MAX,
        }
    }

    /// Returns the length of the best tour, or `u64::MAX` if there is none.
    ///
    /// The value may be improved upon right after it was read; acting on it
    /// can only cause extra work, never a wrong result.
    #[inline(always)]
    pub fn current_length(&self) -> u64 {
        self.length_of(self.best.load().0)
    }

    /// Installs `candidate` if it is strictly shorter than the current best.
    /// Returns whether it was installed.
    pub fn try_improve(&self, candidate: &PathState<'g>) -> bool {
        let length = candidate.total_distance();
        let mut slot = None;
        loop {
            let (current, stamp) = self.best.load();
            if length >= self.length_of(current) {
                return false;
            }

            let new = *slot.get_or_insert_with(|| self.tours.insert(candidate.clone()));
            let next_stamp = stamp.wrapping_add(1);
            if self
                .best
                .compare_and_swap(current, Some(new), stamp, next_stamp)
            {
                tracing::trace!(length, stamp = next_stamp, "installed shorter tour");
                return true;
            }
        }
    }

    /// Returns an owned copy of the best tour, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<Tour> {
        self.best.load().0.map(|slot| self.tour(slot).to_tour())
    }

    /// Returns a copy of the best path, if any.
    #[inline]
    pub fn best(&self) -> Option<PathState<'g>> {
        self.best.load().0.map(|slot| self.tour(slot).clone())
    }

    /// Returns how many tours have been installed, modulo `2^32`.
    #[inline]
    pub fn improvements(&self) -> u64 {
        self.best.load().1 as u64
    }

    /// Returns `true` if no tour has been installed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.best.load().0.is_none()
    }
}

impl std::fmt::Debug for BestBound<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (slot, stamp) = self.best.load();
        f.debug_struct("BestBound")
            .field("best", &slot.map(|slot| self.tour(slot)))
            .field("stamp", &stamp)
            .finish()
    }
}

impl std::fmt::Display for BestBound<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.best.load().0 {
            Some(slot) => write!(f, "BestBound({})", self.tour(slot)),
            None => write!(f, "BestBound(none)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BestBound;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use salesman_model::{graph::Graph, index::NodeIndex, path::PathState};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A two-node graph whose only edge has the given length, so the closed
    /// tour `[0, 1, 0]` has length `2 * edge`.
    fn line(edge: u64) -> Graph {
        Graph::from_matrix(2, vec![0, edge, edge, 0]).expect("valid graph")
    }

    fn closed(graph: &Graph) -> PathState<'_> {
        let mut p = PathState::new(graph);
        for i in [0, 1, 0] {
            p.add(NodeIndex::new(i));
        }
        p
    }

    #[test]
    fn test_initial_state() {
        let bound = BestBound::new();
        assert_eq!(bound.current_length(), u64::MAX);
        assert!(bound.snapshot().is_none());
        assert!(bound.is_empty());
        assert_eq!(bound.improvements(), 0);
        assert_eq!(bound.to_string(), "BestBound(none)");
    }

    #[test]
    fn test_improve_updates_length_and_snapshot() {
        let g = line(50);
        let bound = BestBound::new();
        assert!(bound.try_improve(&closed(&g)));
        assert_eq!(bound.current_length(), 100);
        assert_eq!(bound.improvements(), 1);

        let snap = bound.snapshot().expect("snapshot should be Some");
        assert_eq!(snap.length(), 100);
        assert_eq!(snap.len(), 3);
        assert_eq!(bound.to_string(), "BestBound([100: 0, 1, 0])");
    }

    #[test]
    fn test_reject_worse_or_equal_candidates() {
        let best = line(40);
        let worse = line(75);
        let equal = line(40);
        let bound = BestBound::new();

        assert!(bound.try_improve(&closed(&best)));
        assert!(!bound.try_improve(&closed(&worse)));
        assert!(!bound.try_improve(&closed(&equal)));
        assert_eq!(bound.current_length(), 80);
        assert_eq!(bound.improvements(), 1);
        assert_eq!(bound.snapshot().map(|t| t.length()), Some(80));
    }

    #[test]
    fn test_concurrent_improvements_minimum_wins() {
        let lengths = [300u64, 200, 400, 50, 120, 75, 500, 60, 90];
        let graphs: Vec<Graph> = lengths.iter().map(|&l| line(l)).collect();
        let bound = BestBound::new();

        let installed = std::thread::scope(|scope| {
            let handles: Vec<_> = graphs
                .iter()
                .map(|g| {
                    let bound = &bound;
                    scope.spawn(move || bound.try_improve(&closed(g)))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|&ok| ok)
                .count()
        });

        assert!(installed >= 1, "at least one install should succeed");
        assert_eq!(installed as u64, bound.improvements());
        assert_eq!(bound.current_length(), 100);
        assert_eq!(bound.snapshot().map(|t| t.length()), Some(100));
    }

    #[test]
    fn test_length_is_monotonic_under_contention() {
        let graphs: Vec<Graph> = {
            let mut rng = StdRng::seed_from_u64(0x5eed);
            (0..64).map(|_| line(rng.gen_range(1..10_000))).collect()
        };
        let minimum = graphs
            .iter()
            .map(|g| closed(g).total_distance())
            .min()
            .unwrap();
        let bound = BestBound::new();
        let done = AtomicBool::new(false);

        std::thread::scope(|scope| {
            // Observer: the length must never go up.
            scope.spawn(|| {
                let mut last = u64::MAX;
                while !done.load(Ordering::Acquire) {
                    let now = bound.current_length();
                    assert!(now <= last, "length increased from {} to {}", last, now);
                    last = now;
                }
            });

            let workers: Vec<_> = (0..8)
                .map(|t| {
                    let graphs = &graphs;
                    let bound = &bound;
                    scope.spawn(move || {
                        let mut rng = StdRng::seed_from_u64(t);
                        for _ in 0..500 {
                            let g = &graphs[rng.gen_range(0..graphs.len())];
                            bound.try_improve(&closed(g));
                        }
                        for g in graphs {
                            bound.try_improve(&closed(g));
                        }
                    })
                })
                .collect();
            for w in workers {
                w.join().unwrap();
            }
            done.store(true, Ordering::Release);
        });

        assert_eq!(bound.current_length(), minimum);
        let best = bound.best().expect("bound holds a tour");
        assert_eq!(best.total_distance(), bound.current_length());
    }
}
