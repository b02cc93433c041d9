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

//! Monitoring combinators for tree search
//!
//! Provides `CompositeTreeSearchMonitor`, a fan-out monitor that forwards every
//! event to its children. This lets a worker combine logging and early
//! stopping without coupling them to the search loop.
//!
//! Behavior
//! - Events are dispatched to child monitors in insertion order.
//! - `search_command` short-circuits on the first non-`Continue` response;
//!   put stricter stop conditions first.
//! - Other callbacks always fan out to all children.

use crate::{monitor::tree_search_monitor::TreeSearchMonitor, stats::BnbSolverStatistics};
use salesman_model::{graph::Graph, path::PathState};
use salesman_search::monitor::search_monitor::SearchCommand;

/// A tree search monitor that aggregates multiple monitors and forwards events to all of them.
pub struct CompositeTreeSearchMonitor<'a> {
    monitors: Vec<Box<dyn TreeSearchMonitor + 'a>>,
}

impl Default for CompositeTreeSearchMonitor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CompositeTreeSearchMonitor<'a> {
    /// Creates a new empty `CompositeTreeSearchMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Creates a new `CompositeTreeSearchMonitor` with the specified capacity.
    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a monitor.
    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Returns the number of monitors.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if there are no monitors.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl std::fmt::Debug for CompositeTreeSearchMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.monitors.iter().map(|m| m.name()).collect();
        f.debug_struct("CompositeTreeSearchMonitor")
            .field("monitors", &names)
            .finish()
    }
}

impl TreeSearchMonitor for CompositeTreeSearchMonitor<'_> {
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, graph: &Graph, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(graph, statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(
        &mut self,
        path: &PathState<'_>,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        for monitor in &mut self.monitors {
            if let SearchCommand::Terminate(reason) = monitor.search_command(path, statistics) {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }

    fn on_step(&mut self, path: &PathState<'_>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_step(path, statistics);
        }
    }

    fn on_prune(&mut self, path: &PathState<'_>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_prune(path, statistics);
        }
    }

    fn on_states_enqueued(
        &mut self,
        path: &PathState<'_>,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_states_enqueued(path, count, statistics);
        }
    }

    fn on_solution_found(&mut self, tour: &PathState<'_>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(tour, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;

    struct StopAfter {
        steps: usize,
        limit: usize,
    }

    impl TreeSearchMonitor for StopAfter {
        fn name(&self) -> &str {
            "StopAfter"
        }
        fn on_enter_search(&mut self, _graph: &Graph, _statistics: &BnbSolverStatistics) {}
        fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}
        fn search_command(
            &mut self,
            _path: &PathState<'_>,
            _statistics: &BnbSolverStatistics,
        ) -> SearchCommand {
            if self.steps >= self.limit {
                SearchCommand::Terminate(format!("stopped after {} steps", self.limit))
            } else {
                SearchCommand::Continue
            }
        }
        fn on_step(&mut self, _path: &PathState<'_>, _statistics: &BnbSolverStatistics) {
            self.steps += 1;
        }
        fn on_prune(&mut self, _path: &PathState<'_>, _statistics: &BnbSolverStatistics) {}
        fn on_states_enqueued(
            &mut self,
            _path: &PathState<'_>,
            _count: usize,
            _statistics: &BnbSolverStatistics,
        ) {
        }
        fn on_solution_found(&mut self, _tour: &PathState<'_>, _statistics: &BnbSolverStatistics) {}
    }

    #[test]
    fn test_composite_fans_out_and_short_circuits() {
        let graph = Graph::from_matrix(1, vec![0]).unwrap();
        let path = PathState::new(&graph);
        let stats = BnbSolverStatistics::new(1);

        let mut composite = CompositeTreeSearchMonitor::with_capacity(3);
        composite.add_monitor(NoOperationMonitor::new());
        composite.add_monitor(StopAfter { steps: 0, limit: 2 });
        composite.add_monitor(StopAfter { steps: 0, limit: 1 });
        assert_eq!(composite.len(), 3);

        composite.on_enter_search(&graph, &stats);
        composite.on_step(&path, &stats);
        assert_eq!(
            composite.search_command(&path, &stats),
            SearchCommand::Terminate("stopped after 1 steps".to_string())
        );
        composite.on_step(&path, &stats);
        assert_eq!(
            composite.search_command(&path, &stats),
            SearchCommand::Terminate("stopped after 2 steps".to_string())
        );
    }

    #[test]
    fn test_empty_composite_continues() {
        let graph = Graph::from_matrix(1, vec![0]).unwrap();
        let path = PathState::new(&graph);
        let mut composite = CompositeTreeSearchMonitor::default();
        assert!(composite.is_empty());
        assert_eq!(
            composite.search_command(&path, &BnbSolverStatistics::new(1)),
            SearchCommand::Continue
        );
    }
}
