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

//! Solver facade and builder.

use salesman_bnb::{bnb::BnbSolver, config::BnbSolverConfig, result::BnbSolverOutcome};
use salesman_model::graph::Graph;
use salesman_search::result::SolverOutcome;
use std::{sync::atomic::AtomicBool, time::Duration};

/// A configured solver. Build one with `SolverBuilder`.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: BnbSolverConfig,
}

impl Solver {
    #[inline]
    pub fn config(&self) -> &BnbSolverConfig {
        &self.config
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.config.worker_count()
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.config.time_limit
    }

    #[inline]
    pub fn has_time_limit(&self) -> bool {
        self.config.time_limit.is_some()
    }

    /// Solves `graph` and reports the engine-independent outcome.
    pub fn solve(&self, graph: &Graph) -> SolverOutcome {
        self.solve_detailed(graph, None).into()
    }

    /// Like `solve`, but also stops as soon as `interrupt` is raised.
    pub fn solve_with_interrupt(&self, graph: &Graph, interrupt: &AtomicBool) -> SolverOutcome {
        self.solve_detailed(graph, Some(interrupt)).into()
    }

    /// Solves `graph` and keeps the branch-and-bound counters, including the
    /// per-depth prune histogram.
    pub fn solve_detailed(
        &self,
        graph: &Graph,
        interrupt: Option<&AtomicBool>,
    ) -> BnbSolverOutcome {
        let engine = BnbSolver::with_config(self.config.clone());
        match interrupt {
            Some(flag) => engine.run_with_interrupt(graph, flag),
            None => engine.run(graph),
        }
    }
}

/// Fluent builder for `Solver`.
#[derive(Debug, Clone, Default)]
pub struct SolverBuilder {
    config: BnbSolverConfig,
}

impl SolverBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Fixes the depth below which partial tours are shared between workers.
    #[inline]
    pub fn with_depth_threshold(mut self, depth_threshold: usize) -> Self {
        self.config.depth_threshold = Some(depth_threshold);
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.config.pruning = pruning;
        self
    }

    /// Enables the periodic progress log.
    #[inline]
    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.config.log_interval = Some(interval);
        self
    }

    #[inline]
    pub fn build(self) -> Solver {
        Solver {
            config: self.config,
        }
    }
}
