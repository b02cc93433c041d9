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

//! Parallel branch-and-bound driver.
//!
//! `BnbSolver` owns the configuration of a run and nothing else. A call to
//! `run` builds a fresh `SearchContext`, seeds the shared queue on the calling
//! thread, then starts the configured number of `Worker`s in a thread scope
//! and blocks until all of them have returned. Seeding before any worker
//! starts means no worker can observe an empty queue before the search has
//! begun.
//!
//! Each worker owns its monitor stack:
//!
//! ```raw
//! CompositeTreeSearchMonitor
//! ├── WrapperMonitor(CompositeMonitor[InterruptMonitor?, TimeLimitMonitor?])
//! └── LogMonitor                       worker 0 only, when a log interval is set
//! ```
//!
//! The first worker (by id) that reports `Aborted` decides the termination
//! reason. Without any abort the tree was exhausted and the best tour is
//! optimal.

use crate::{
    config::BnbSolverConfig,
    context::SearchContext,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::LogMonitor, wrapper::WrapperMonitor,
    },
    result::BnbSolverOutcome,
    stats::BnbSolverStatistics,
    worker::{Worker, WorkerOutcome, WorkerTermination},
};
use salesman_model::{graph::Graph, path::PathState};
use salesman_search::monitor::{
    composite::CompositeMonitor, interrupt::InterruptMonitor, time_limit::TimeLimitMonitor,
};
use std::sync::atomic::AtomicBool;

/// How many queue entries the seeding phase aims for per worker.
const SEED_STATES_PER_WORKER: usize = 4;

/// A parallel, exact branch-and-bound solver for the symmetric TSP.
#[derive(Debug, Clone, Default)]
pub struct BnbSolver {
    config: BnbSolverConfig,
}

/// Everything a finished search hands back, before it is turned into an outcome.
struct SearchReport<'g> {
    best: Option<PathState<'g>>,
    statistics: BnbSolverStatistics,
    abort_reason: Option<String>,
    workers: usize,
}

impl BnbSolver {
    /// Creates a solver with the default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_config(config: BnbSolverConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &BnbSolverConfig {
        &self.config
    }

    /// Runs an unlimited search with `worker_count` threads and returns the
    /// optimal closed tour.
    ///
    /// An unlimited search always closes at least one tour, so the empty
    /// path is only returned if that invariant is broken.
    pub fn solve(graph: &Graph, worker_count: usize) -> PathState<'_> {
        let solver = Self::with_config(BnbSolverConfig {
            workers: worker_count,
            ..BnbSolverConfig::default()
        });
        solver
            .search(graph, None)
            .best
            .unwrap_or_else(|| PathState::new(graph))
    }

    /// Solves `graph` with the configured limits.
    pub fn run(&self, graph: &Graph) -> BnbSolverOutcome {
        self.finish(self.search(graph, None))
    }

    /// Solves `graph`, additionally stopping once `interrupt` is raised.
    pub fn run_with_interrupt(&self, graph: &Graph, interrupt: &AtomicBool) -> BnbSolverOutcome {
        self.finish(self.search(graph, Some(interrupt)))
    }

    fn finish(&self, report: SearchReport<'_>) -> BnbSolverOutcome {
        let tour = report.best.as_ref().map(PathState::to_tour);
        match (report.abort_reason, tour) {
            (None, Some(tour)) => {
                BnbSolverOutcome::optimal(tour, report.statistics, report.workers)
            }
            (None, None) => BnbSolverOutcome::aborted(
                None,
                "search exhausted without closing a tour",
                report.statistics,
                report.workers,
            ),
            (Some(reason), tour) => {
                BnbSolverOutcome::aborted(tour, reason, report.statistics, report.workers)
            }
        }
    }

    fn search<'g>(&self, graph: &'g Graph, interrupt: Option<&AtomicBool>) -> SearchReport<'g> {
        let start_time = std::time::Instant::now();
        let size = graph.size();
        let workers = self.config.worker_count();
        let depth_threshold = self.config.depth_threshold_for(size);
        let time_limit = self.config.time_limit;
        let log_interval = self.config.log_interval;

        let ctx = SearchContext::new(graph, depth_threshold, self.config.pruning);
        let seeded = ctx.seed(workers.saturating_mul(SEED_STATES_PER_WORKER));

        tracing::info!(
            nodes = size,
            workers,
            depth_threshold,
            pruning = self.config.pruning,
            "starting branch-and-bound search"
        );
        tracing::debug!(seeded, "seeded work queue");

        let outcomes: Vec<WorkerOutcome> = std::thread::scope(|scope| {
            let ctx = &ctx;
            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    scope.spawn(move || {
                        let mut limits = CompositeMonitor::with_capacity(2);
                        if let Some(flag) = interrupt {
                            limits.add_monitor(InterruptMonitor::new(flag));
                        }
                        if let Some(limit) = time_limit {
                            limits.add_monitor(TimeLimitMonitor::new(limit));
                        }

                        let mut monitor = CompositeTreeSearchMonitor::with_capacity(2);
                        monitor.add_monitor(WrapperMonitor::new(&mut limits));
                        if let (0, Some(interval)) = (id, log_interval) {
                            monitor.add_monitor(LogMonitor::new(ctx.bound(), interval));
                        }

                        Worker::new(id, ctx, monitor).run()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().expect("search worker thread panicked"))
                .collect()
        });

        let mut statistics = BnbSolverStatistics::new(size);
        let mut abort_reason = None;
        for outcome in &outcomes {
            statistics.merge(&outcome.statistics);
            if let (None, WorkerTermination::Aborted(reason)) = (&abort_reason, &outcome.termination)
            {
                abort_reason = Some(reason.clone());
            }
        }
        statistics.set_total_time(start_time.elapsed());

        let best = ctx.best();
        tracing::info!(
            length = best.as_ref().map(PathState::total_distance),
            verified = statistics.paths_verified,
            pruned = statistics.prunings(),
            aborted = abort_reason.is_some(),
            elapsed = ?statistics.time_total,
            "search finished"
        );

        SearchReport {
            best,
            statistics,
            abort_reason,
            workers,
        }
    }
}

impl std::fmt::Display for BnbSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BnbSolver(workers: {}, pruning: {})",
            self.config.worker_count(),
            self.config.pruning
        )
    }
}
