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

//! Search worker.
//!
//! A worker runs the following state machine until it reaches `DONE`:
//!
//! ```raw
//! FETCH ──► LEAF ───► FETCH       closed tour offered to the best bound
//!   │   ──► BOUND ──► FETCH       partial tour discarded
//!   │   ──► EXPAND ─► FETCH       children enqueued or searched in-thread
//!   └─► DONE                      queue empty, stop flag raised or monitor abort
//! ```
//!
//! `EXPAND` splits on the depth threshold of the context: a partial tour
//! shorter than the threshold pushes its children onto the shared queue so
//! idle workers can pick them up; a deeper one is searched depth-first right
//! here, running the same `LEAF` / `BOUND` / `EXPAND` classification on every
//! node and backtracking with `PathState::add` / `PathState::pop` instead of
//! cloning.
//!
//! Every state pulled from the queue is strictly deeper than the state that
//! pushed it, so the queue drains and every worker eventually sees it empty.

use crate::{
    context::{children, SearchContext},
    monitor::tree_search_monitor::TreeSearchMonitor,
    stats::BnbSolverStatistics,
};
use salesman_model::{index::NodeIndex, path::PathState};
use salesman_search::monitor::search_monitor::SearchCommand;
use std::ops::ControlFlow;

/// How a worker left its loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerTermination {
    /// The queue was observed empty.
    Exhausted,
    /// Another worker raised the stop flag.
    Stopped,
    /// A monitor of this worker asked to terminate.
    Aborted(String),
}

impl std::fmt::Display for WorkerTermination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerTermination::Exhausted => write!(f, "Exhausted"),
            WorkerTermination::Stopped => write!(f, "Stopped"),
            WorkerTermination::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// What a worker reports back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutcome {
    pub id: usize,
    pub termination: WorkerTermination,
    pub statistics: BnbSolverStatistics,
}

/// The classification of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Leaf,
    Bound,
    Expand,
}

/// One search thread's view of the shared search.
pub struct Worker<'c, 'g, M> {
    id: usize,
    ctx: &'c SearchContext<'g>,
    monitor: M,
    stats: BnbSolverStatistics,
}

impl<'c, 'g, M> Worker<'c, 'g, M>
where
    M: TreeSearchMonitor,
{
    #[inline]
    pub fn new(id: usize, ctx: &'c SearchContext<'g>, monitor: M) -> Self {
        Self {
            id,
            ctx,
            monitor,
            stats: BnbSolverStatistics::new(ctx.graph().size()),
        }
    }

    /// Runs the worker until the queue is drained or the search is stopped.
    pub fn run(mut self) -> WorkerOutcome {
        let span = tracing::debug_span!("worker", id = self.id);
        let _guard = span.enter();

        let start_time = std::time::Instant::now();
        self.monitor.on_enter_search(self.ctx.graph(), &self.stats);

        let termination = loop {
            // FETCH
            if self.ctx.is_stopped() {
                break WorkerTermination::Stopped;
            }
            let Ok(mut path) = self.ctx.queue().dequeue() else {
                break WorkerTermination::Exhausted;
            };
            self.stats.on_state_fetched();

            if let ControlFlow::Break(termination) = self.visit(&mut path) {
                if let WorkerTermination::Aborted(reason) = &termination {
                    tracing::debug!(reason = %reason, "raising stop flag");
                    self.ctx.raise_stop();
                }
                break termination;
            }
        };

        self.stats.set_total_time(start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        tracing::debug!(
            termination = %termination,
            nodes = self.stats.nodes_explored,
            verified = self.stats.paths_verified,
            pruned = self.stats.prunings(),
            "worker finished"
        );

        WorkerOutcome {
            id: self.id,
            termination,
            statistics: self.stats,
        }
    }

    #[inline(always)]
    fn classify(&self, path: &PathState<'g>) -> Step {
        if path.leaf() {
            Step::Leaf
        } else if self.ctx.should_prune(path) {
            Step::Bound
        } else {
            Step::Expand
        }
    }

    /// Processes one search node and, below the depth threshold, its subtree.
    fn visit(&mut self, path: &mut PathState<'g>) -> ControlFlow<WorkerTermination> {
        self.stats.on_node_explored(path.len());
        self.monitor.on_step(path, &self.stats);
        if let SearchCommand::Terminate(reason) = self.monitor.search_command(path, &self.stats) {
            return ControlFlow::Break(WorkerTermination::Aborted(reason));
        }

        match self.classify(path) {
            Step::Leaf => self.close_tour(path),
            Step::Bound => self.prune(path),
            Step::Expand if path.len() < self.ctx.depth_threshold() => self.split(path),
            Step::Expand => return self.descend(path),
        }
        ControlFlow::Continue(())
    }

    /// LEAF: closes the tour back to the start and offers it to the bound.
    fn close_tour(&mut self, path: &mut PathState<'g>) {
        path.add(NodeIndex::new(0));
        self.stats.on_path_verified();

        if self.ctx.bound().try_improve(path) {
            self.stats.on_solution_found();
            self.monitor.on_solution_found(path, &self.stats);
            tracing::debug!(length = path.total_distance(), tour = %path, "found shorter tour");
        } else {
            tracing::trace!(length = path.total_distance(), "verified tour");
        }

        path.pop();
    }

    /// BOUND: discards a partial tour that already reached the best length.
    fn prune(&mut self, path: &PathState<'g>) {
        self.stats.on_pruning(path.len());
        self.monitor.on_prune(path, &self.stats);
        tracing::trace!(depth = path.len(), length = path.total_distance(), "pruned");
    }

    /// EXPAND above the threshold: hands the children to the shared queue.
    fn split(&mut self, path: &PathState<'g>) {
        let mut count = 0;
        for child in children(path) {
            self.ctx.queue().enqueue(child);
            self.stats.on_state_enqueued();
            count += 1;
        }
        self.monitor.on_states_enqueued(path, count, &self.stats);
    }

    /// EXPAND below the threshold: searches the subtree depth-first.
    fn descend(&mut self, path: &mut PathState<'g>) -> ControlFlow<WorkerTermination> {
        let graph = self.ctx.graph();
        for node in graph.nodes().skip(1) {
            if path.contains(node) {
                continue;
            }
            if self.ctx.is_stopped() {
                return ControlFlow::Break(WorkerTermination::Stopped);
            }

            path.add(node);
            let flow = self.visit(path);
            path.pop();
            if flow.is_break() {
                return flow;
            }
        }
        ControlFlow::Continue(())
    }
}

impl<M> std::fmt::Debug for Worker<'_, '_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;
    use salesman_model::graph::Graph;

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
    fn test_single_worker_finds_optimum() {
        let g = four_nodes();
        let ctx = SearchContext::new(&g, 2, true);
        ctx.seed(1);
        let outcome = Worker::new(0, &ctx, NoOperationMonitor::new()).run();

        assert_eq!(outcome.termination, WorkerTermination::Exhausted);
        assert_eq!(ctx.bound().current_length(), 80);
        assert!(outcome.statistics.is_consistent(4));
        assert!(ctx.queue().is_empty());
    }

    #[test]
    fn test_exhaustive_worker_verifies_every_tour() {
        let g = four_nodes();
        let ctx = SearchContext::new(&g, 4, false);
        ctx.seed(1);
        let outcome = Worker::new(0, &ctx, NoOperationMonitor::new()).run();

        assert_eq!(outcome.statistics.paths_verified, 6);
        assert_eq!(outcome.statistics.prunings(), 0);
        assert_eq!(ctx.bound().current_length(), 80);
    }

    #[test]
    fn test_in_thread_search_leaves_the_path_unchanged() {
        let g = Graph::random_euclidean(7, 3);
        let ctx = SearchContext::new(&g, 1, true);
        let mut worker = Worker::new(0, &ctx, NoOperationMonitor::new());

        let mut root = PathState::new(&g);
        root.add(NodeIndex::new(0));
        assert_eq!(worker.visit(&mut root), ControlFlow::Continue(()));
        assert_eq!(root.len(), 1);
        assert_eq!(root.total_distance(), 0);
        assert!(worker.stats.is_consistent(7));
    }

    #[test]
    fn test_stopped_context_ends_worker_immediately() {
        let g = four_nodes();
        let ctx = SearchContext::new(&g, 2, true);
        ctx.seed(1);
        ctx.raise_stop();
        let outcome = Worker::new(3, &ctx, NoOperationMonitor::new()).run();

        assert_eq!(outcome.id, 3);
        assert_eq!(outcome.termination, WorkerTermination::Stopped);
        assert_eq!(outcome.statistics.states_fetched, 0);
        assert!(ctx.bound().is_empty());
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(WorkerTermination::Exhausted.to_string(), "Exhausted");
        assert_eq!(
            WorkerTermination::Aborted("time limit reached".into()).to_string(),
            "Aborted: time limit reached"
        );
    }
}
