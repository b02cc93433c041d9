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

//! Periodic progress log.
//!
//! `LogMonitor` writes one `tracing` event at `INFO` level every
//! `log_interval`, carrying elapsed time, explored nodes, current depth,
//! the global best length and the prune count of its worker. The clock is
//! only read when the node counter passes `clock_check_mask`.

use crate::{monitor::tree_search_monitor::TreeSearchMonitor, stats::BnbSolverStatistics};
use salesman_model::{graph::Graph, path::PathState};
use salesman_search::bound::BestBound;
use std::time::{Duration, Instant};

pub struct LogMonitor<'a, 'g> {
    bound: &'a BestBound<'g>,
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
}

impl<'a, 'g> LogMonitor<'a, 'g> {
    const DEFAULT_CLOCK_CHECK_MASK: u64 = 4095;

    pub fn new(bound: &'a BestBound<'g>, log_interval: Duration) -> Self {
        Self::with_clock_check_mask(bound, log_interval, Self::DEFAULT_CLOCK_CHECK_MASK)
    }

    pub fn with_clock_check_mask(
        bound: &'a BestBound<'g>,
        log_interval: Duration,
        clock_check_mask: u64,
    ) -> Self {
        Self {
            bound,
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
        }
    }

    fn log_line(&mut self, path: &PathState<'_>, stats: &BnbSolverStatistics) {
        let now = Instant::now();
        let best = match self.bound.current_length() {
            u64::MAX => "inf".to_string(),
            length => length.to_string(),
        };
        tracing::info!(
            elapsed_secs = now.duration_since(self.start_time).as_secs_f32(),
            nodes = stats.nodes_explored,
            depth = path.len(),
            best = %best,
            current = path.total_distance(),
            verified = stats.paths_verified,
            pruned = stats.prunings(),
            "search progress"
        );
        self.last_log_time = now;
    }
}

impl std::fmt::Debug for LogMonitor<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogMonitor")
            .field("log_interval", &self.log_interval)
            .field("clock_check_mask", &self.clock_check_mask)
            .finish()
    }
}

impl std::fmt::Display for LogMonitor<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs(),
            self.clock_check_mask
        )
    }
}

impl TreeSearchMonitor for LogMonitor<'_, '_> {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&mut self, graph: &Graph, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        tracing::info!(nodes = graph.size(), "search started");
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        tracing::info!(
            elapsed_secs = self.start_time.elapsed().as_secs_f32(),
            nodes = statistics.nodes_explored,
            "search finished"
        );
    }

    #[inline]
    fn on_step(&mut self, path: &PathState<'_>, statistics: &BnbSolverStatistics) {
        if (statistics.nodes_explored & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line(path, statistics);
        }
    }

    fn on_prune(&mut self, _path: &PathState<'_>, _statistics: &BnbSolverStatistics) {}

    fn on_states_enqueued(
        &mut self,
        _path: &PathState<'_>,
        _count: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_solution_found(&mut self, tour: &PathState<'_>, _statistics: &BnbSolverStatistics) {
        tracing::info!(length = tour.total_distance(), tour = %tour, "shorter tour found");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesman_model::index::NodeIndex;

    #[test]
    fn test_display() {
        let bound = BestBound::new();
        let monitor = LogMonitor::new(&bound, Duration::from_secs(2));
        assert_eq!(
            monitor.to_string(),
            "LogMonitor(log_interval: 2s, clock_check_mask: 4095)"
        );
        assert_eq!(monitor.name(), "LogMonitor");
    }

    #[test]
    fn test_logging_does_not_disturb_the_search_state() {
        let graph = Graph::from_matrix(2, vec![0, 3, 3, 0]).unwrap();
        let bound = BestBound::new();
        let mut monitor = LogMonitor::with_clock_check_mask(&bound, Duration::ZERO, 0);
        let mut stats = BnbSolverStatistics::new(2);
        let mut path = PathState::new(&graph);
        path.add(NodeIndex::new(0));

        monitor.on_enter_search(&graph, &stats);
        stats.on_node_explored(1);
        monitor.on_step(&path, &stats);
        assert!(monitor.last_log_time >= monitor.start_time);
        monitor.on_exit_search(&stats);
        assert_eq!(bound.current_length(), u64::MAX);
    }
}
