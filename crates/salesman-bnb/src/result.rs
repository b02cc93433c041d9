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

use crate::stats::BnbSolverStatistics;
use salesman_model::tour::Tour;
use salesman_search::{
    result::{SolverOutcome, SolverResult, TerminationReason},
    stats::SolverStatisticsBuilder,
};

/// Result of the solver after termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BnbSolverOutcome {
    result: SolverResult,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
    workers: usize,
}

impl BnbSolverOutcome {
    #[inline]
    pub fn optimal(tour: Tour, statistics: BnbSolverStatistics, workers: usize) -> Self {
        Self {
            result: SolverResult::Optimal(tour),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
            workers,
        }
    }

    #[inline]
    pub fn aborted<R>(
        tour: Option<Tour>,
        reason: R,
        statistics: BnbSolverStatistics,
        workers: usize,
    ) -> Self
    where
        R: Into<String>,
    {
        let result = match tour {
            Some(tour) => SolverResult::Feasible(tour),
            None => SolverResult::Unknown,
        };
        Self {
            result,
            termination_reason: TerminationReason::Aborted(reason.into()),
            statistics,
            workers,
        }
    }

    /// Returns the solver result.
    #[inline]
    pub fn result(&self) -> &SolverResult {
        &self.result
    }

    /// Returns the termination reason.
    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    /// Returns the merged statistics of all workers.
    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    /// Returns the number of worker threads that ran.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the best tour, if any.
    #[inline]
    pub fn tour(&self) -> Option<&Tour> {
        self.result.tour()
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }
}

impl std::fmt::Display for BnbSolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({})", self.result, self.termination_reason)?;
        write!(f, "{}", self.statistics)
    }
}

impl From<BnbSolverOutcome> for SolverOutcome {
    fn from(val: BnbSolverOutcome) -> Self {
        let statistics = SolverStatisticsBuilder::new()
            .solutions_found(val.statistics.solutions_found)
            .used_threads(val.workers)
            .paths_verified(val.statistics.paths_verified)
            .prunings(val.statistics.prunings())
            .solve_duration(val.statistics.time_total)
            .build();
        SolverOutcome::new(val.result, val.termination_reason, statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesman_model::index::NodeIndex;
    use std::time::Duration;

    fn tour(length: u64) -> Tour {
        Tour::new([0, 1, 2, 0].map(NodeIndex::new).to_vec(), length)
    }

    fn stats() -> BnbSolverStatistics {
        let mut stats = BnbSolverStatistics::new(3);
        stats.paths_verified = 2;
        stats.solutions_found = 1;
        stats.on_pruning(2);
        stats.set_total_time(Duration::from_millis(12));
        stats
    }

    #[test]
    fn test_aborted_without_tour_is_unknown() {
        let outcome = BnbSolverOutcome::aborted(None, "time limit reached", stats(), 4);
        assert_eq!(outcome.result(), &SolverResult::Unknown);
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::Aborted("time limit reached".to_string())
        );
        assert!(!outcome.is_optimal());
    }

    #[test]
    fn test_aborted_with_tour_is_feasible() {
        let outcome = BnbSolverOutcome::aborted(Some(tour(9)), "stop", stats(), 1);
        assert!(matches!(outcome.result(), SolverResult::Feasible(t) if t.length() == 9));
    }

    #[test]
    fn test_into_solver_outcome_maps_statistics() {
        let outcome: SolverOutcome = BnbSolverOutcome::optimal(tour(30), stats(), 8).into();
        assert!(outcome.is_optimal());
        assert_eq!(outcome.statistics.used_threads, 8);
        assert_eq!(outcome.statistics.paths_verified, 2);
        assert_eq!(outcome.statistics.solutions_found, 1);
        assert_eq!(outcome.statistics.prunings, 1);
        assert_eq!(outcome.statistics.solve_duration, Duration::from_millis(12));
    }
}
