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

//! Engine configuration.

use std::time::Duration;

/// Number of worker threads used when none is configured.
pub const DEFAULT_WORKERS: usize = 10;

/// Graphs up to this size use `SMALL_GRAPH_DEPTH_THRESHOLD`.
const SMALL_GRAPH_SIZE: usize = 14;
const SMALL_GRAPH_DEPTH_THRESHOLD: usize = 6;
/// Larger graphs explore the last this-many levels in-thread.
const IN_THREAD_LEVELS: usize = 12;

/// Returns the automatic depth threshold for a graph of `size` nodes: 6 for
/// graphs of up to 14 nodes, `size - 12` beyond, never more than `size`.
#[inline]
pub fn default_depth_threshold(size: usize) -> usize {
    let threshold = if size <= SMALL_GRAPH_SIZE {
        SMALL_GRAPH_DEPTH_THRESHOLD
    } else {
        size - IN_THREAD_LEVELS
    };
    threshold.min(size).max(1)
}

/// Settings of one `BnbSolver` run.
///
/// The depth threshold splits the search tree: partial tours shorter than the
/// threshold hand their children to the shared queue, longer ones are searched
/// depth-first by the worker that fetched them. Any threshold in `1..=n`
/// yields the same optimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BnbSolverConfig {
    /// Number of worker threads (at least one is always used).
    pub workers: usize,
    /// Fixed depth threshold, or `None` for `default_depth_threshold`.
    pub depth_threshold: Option<usize>,
    /// Whether partial tours are discarded once they reach the best length.
    /// Disabling this enumerates every tour.
    pub pruning: bool,
    /// Wall-clock budget of the search.
    pub time_limit: Option<Duration>,
    /// Interval of the progress log written by worker 0.
    pub log_interval: Option<Duration>,
}

impl Default for BnbSolverConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            depth_threshold: None,
            pruning: true,
            time_limit: None,
            log_interval: None,
        }
    }
}

impl BnbSolverConfig {
    /// Returns the depth threshold to use on a graph of `size` nodes, clamped
    /// to `1..=size`.
    #[inline]
    pub fn depth_threshold_for(&self, size: usize) -> usize {
        match self.depth_threshold {
            Some(threshold) => threshold.clamp(1, size.max(1)),
            None => default_depth_threshold(size),
        }
    }

    /// Returns the number of workers to spawn.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_depth_threshold() {
        assert_eq!(default_depth_threshold(1), 1);
        assert_eq!(default_depth_threshold(4), 4);
        assert_eq!(default_depth_threshold(6), 6);
        assert_eq!(default_depth_threshold(14), 6);
        assert_eq!(default_depth_threshold(15), 3);
        assert_eq!(default_depth_threshold(20), 8);
        assert_eq!(default_depth_threshold(100), 88);
    }

    #[test]
    fn test_default_config() {
        let config = BnbSolverConfig::default();
        assert_eq!(config.worker_count(), DEFAULT_WORKERS);
        assert!(config.pruning);
        assert_eq!(config.time_limit, None);
        assert_eq!(config.depth_threshold_for(10), 6);
    }

    #[test]
    fn test_explicit_threshold_is_clamped() {
        let config = BnbSolverConfig {
            depth_threshold: Some(50),
            workers: 0,
            ..BnbSolverConfig::default()
        };
        assert_eq!(config.depth_threshold_for(8), 8);
        assert_eq!(config.worker_count(), 1);

        let config = BnbSolverConfig {
            depth_threshold: Some(0),
            ..BnbSolverConfig::default()
        };
        assert_eq!(config.depth_threshold_for(8), 1);
    }
}
