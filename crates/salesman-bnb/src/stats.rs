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

//! Search counters and statistics.
//!
//! Each worker counts into its own `BnbSolverStatistics` without any
//! synchronisation; the orchestrator merges them after the workers joined.
//!
//! Besides throughput numbers the statistics carry the three counters that
//! account for every complete tour of the instance:
//!
//! - `paths_verified`: closed tours that were evaluated against the bound,
//! - `solutions_found`: evaluations that installed a shorter tour,
//! - `prunings_by_depth[k]`: partial tours of `k` nodes discarded by the bound.
//!
//! A pruned partial tour of `k` nodes stands for `(n - k)!` complete tours, so
//! an exhausted search on `n` nodes satisfies
//!
//! ```raw
//! (n - 1)! == paths_verified + Σ_k (n - k)! · prunings_by_depth[k]
//! ```
//!
//! which `is_consistent` checks.

use salesman_core::num::{factorial, SaturatingAddVal, SaturatingMulVal};
use std::time::Duration;

/// Statistics collected by one worker, or merged over all of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BnbSolverStatistics {
    /// Search nodes visited (fetched and recursed states).
    pub nodes_explored: u64,
    /// States taken from the shared queue.
    pub states_fetched: u64,
    /// States put on the shared queue.
    pub states_enqueued: u64,
    /// Closed tours evaluated against the bound.
    pub paths_verified: u64,
    /// Closed tours that improved the bound.
    pub solutions_found: u64,
    /// Partial tours discarded by the bound, indexed by their node count.
    pub prunings_by_depth: Vec<u64>,
    /// Longest partial tour seen.
    pub max_depth: u64,
    /// Wall-clock time spent in the search.
    pub time_total: Duration,
}

impl BnbSolverStatistics {
    /// Creates zeroed statistics able to record prunings on a graph of `size` nodes.
    #[inline]
    pub fn new(size: usize) -> Self {
        Self {
            prunings_by_depth: vec![0; size + 1],
            ..Self::default()
        }
    }

    #[inline]
    pub fn on_node_explored(&mut self, depth: usize) {
        self.nodes_explored = self.nodes_explored.saturating_add_val(1);
        self.max_depth = self.max_depth.max(depth as u64);
    }

    #[inline]
    pub fn on_state_fetched(&mut self) {
        self.states_fetched = self.states_fetched.saturating_add_val(1);
    }

    #[inline]
    pub fn on_state_enqueued(&mut self) {
        self.states_enqueued = self.states_enqueued.saturating_add_val(1);
    }

    #[inline]
    pub fn on_path_verified(&mut self) {
        self.paths_verified = self.paths_verified.saturating_add_val(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add_val(1);
    }

    /// Records a prune of a partial tour holding `depth` nodes.
    #[inline]
    pub fn on_pruning(&mut self, depth: usize) {
        if depth >= self.prunings_by_depth.len() {
            self.prunings_by_depth.resize(depth + 1, 0);
        }
        self.prunings_by_depth[depth] = self.prunings_by_depth[depth].saturating_add_val(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Returns the number of prunes over all depths.
    #[inline]
    pub fn prunings(&self) -> u64 {
        self.prunings_by_depth
            .iter()
            .fold(0u64, |acc, &p| acc.saturating_add_val(p))
    }

    /// Adds the counters of `other` into `self`. Times and depths take the maximum.
    pub fn merge(&mut self, other: &BnbSolverStatistics) {
        self.nodes_explored = self.nodes_explored.saturating_add_val(other.nodes_explored);
        self.states_fetched = self.states_fetched.saturating_add_val(other.states_fetched);
        self.states_enqueued = self.states_enqueued.saturating_add_val(other.states_enqueued);
        self.paths_verified = self.paths_verified.saturating_add_val(other.paths_verified);
        self.solutions_found = self.solutions_found.saturating_add_val(other.solutions_found);
        if other.prunings_by_depth.len() > self.prunings_by_depth.len() {
            self.prunings_by_depth.resize(other.prunings_by_depth.len(), 0);
        }
        for (mine, theirs) in self.prunings_by_depth.iter_mut().zip(&other.prunings_by_depth) {
            *mine = mine.saturating_add_val(*theirs);
        }
        self.max_depth = self.max_depth.max(other.max_depth);
        self.time_total = self.time_total.max(other.time_total);
    }

    /// Returns the number of complete tours the counters account for:
    /// verified tours plus `(size - k)!` for every prune at depth `k`.
    pub fn accounted_tours(&self, size: usize) -> u128 {
        self.prunings_by_depth
            .iter()
            .enumerate()
            .filter(|&(depth, &count)| count > 0 && depth <= size)
            .fold(self.paths_verified as u128, |acc, (depth, &count)| {
                acc.saturating_add_val(factorial(size - depth).saturating_mul_val(count as u128))
            })
    }

    /// Returns `true` if the counters account for exactly the `(size - 1)!`
    /// tours of a graph with `size` nodes. Holds for every search that ran
    /// to exhaustion.
    #[inline]
    pub fn is_consistent(&self, size: usize) -> bool {
        size > 0 && self.accounted_tours(size) == factorial(size - 1)
    }
}

impl std::fmt::Display for BnbSolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Branch-and-Bound Statistics:")?;
        writeln!(f, "  Nodes explored:       {}", self.nodes_explored)?;
        writeln!(f, "  States fetched:       {}", self.states_fetched)?;
        writeln!(f, "  States enqueued:      {}", self.states_enqueued)?;
        writeln!(f, "  Paths verified:       {}", self.paths_verified)?;
        writeln!(f, "  Shorter paths found:  {}", self.solutions_found)?;
        writeln!(f, "  Prunings (total):     {}", self.prunings())?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        for (depth, count) in self.prunings_by_depth.iter().enumerate() {
            if *count > 0 {
                writeln!(f, "    pruned at depth {:>3}: {}", depth, count)?;
            }
        }
        Ok(())
    }
}
