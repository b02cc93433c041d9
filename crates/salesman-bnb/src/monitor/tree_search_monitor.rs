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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait for observing and controlling one
//! branch-and-bound worker. Callbacks track the worker lifecycle, and a monitor
//! can stop the whole search via `SearchCommand` (default: Continue).
//!
//! Lifecycle highlights
//! - enter → {step → prune | enqueue | solution} → exit
//! - `BnbSolverStatistics` of the calling worker is passed to every callback.
//!
//! Design notes
//! - Methods take `&mut self`; each worker thread owns its monitor.
//! - Keep callbacks lightweight: `on_step` runs for every search node.

use crate::stats::BnbSolverStatistics;
use salesman_model::{graph::Graph, path::PathState};
use salesman_search::monitor::search_monitor::SearchCommand;

/// Trait for monitoring and controlling a search worker.
pub trait TreeSearchMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called when the worker starts.
    fn on_enter_search(&mut self, graph: &Graph, statistics: &BnbSolverStatistics);

    /// Called when the worker ends.
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics);

    /// Called to determine whether the search may continue.
    fn search_command(
        &mut self,
        _path: &PathState<'_>,
        _statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        SearchCommand::Continue
    }

    /// Called for every visited search node.
    fn on_step(&mut self, path: &PathState<'_>, statistics: &BnbSolverStatistics);

    /// Called when a partial tour is discarded by the bound.
    fn on_prune(&mut self, path: &PathState<'_>, statistics: &BnbSolverStatistics);

    /// Called when the children of `path` were put on the shared queue.
    fn on_states_enqueued(
        &mut self,
        path: &PathState<'_>,
        count: usize,
        statistics: &BnbSolverStatistics,
    );

    /// Called when this worker installed a shorter closed tour.
    fn on_solution_found(&mut self, tour: &PathState<'_>, statistics: &BnbSolverStatistics);
}

impl std::fmt::Debug for dyn TreeSearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl std::fmt::Display for dyn TreeSearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<M> TreeSearchMonitor for &mut M
where
    M: TreeSearchMonitor + ?Sized,
{
    #[inline(always)]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline(always)]
    fn on_enter_search(&mut self, graph: &Graph, statistics: &BnbSolverStatistics) {
        (**self).on_enter_search(graph, statistics)
    }

    #[inline(always)]
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        (**self).on_exit_search(statistics)
    }

    #[inline(always)]
    fn search_command(
        &mut self,
        path: &PathState<'_>,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        (**self).search_command(path, statistics)
    }

    #[inline(always)]
    fn on_step(&mut self, path: &PathState<'_>, statistics: &BnbSolverStatistics) {
        (**self).on_step(path, statistics)
    }

    #[inline(always)]
    fn on_prune(&mut self, path: &PathState<'_>, statistics: &BnbSolverStatistics) {
        (**self).on_prune(path, statistics)
    }

    #[inline(always)]
    fn on_states_enqueued(
        &mut self,
        path: &PathState<'_>,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        (**self).on_states_enqueued(path, count, statistics)
    }

    #[inline(always)]
    fn on_solution_found(&mut self, tour: &PathState<'_>, statistics: &BnbSolverStatistics) {
        (**self).on_solution_found(tour, statistics)
    }
}
