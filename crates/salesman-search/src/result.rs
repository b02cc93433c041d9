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

//! Solver results.
//!
//! A TSP instance with at least one node always has a tour, so there is no
//! infeasible outcome: a search either exhausts the tree (`Optimal`), stops
//! early holding a tour (`Feasible`), or stops before the first closed tour
//! (`Unknown`).

use crate::stats::SolverStatistics;
use salesman_model::tour::Tour;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult {
    /// We have found a tour and proven its optimality.
    Optimal(Tour),
    /// We have found a tour, but not proven its optimality.
    Feasible(Tour),
    /// The solver terminated before any tour was closed.
    Unknown,
}

impl SolverResult {
    /// Returns the tour, if the result carries one.
    #[inline]
    pub fn tour(&self) -> Option<&Tour> {
        match self {
            SolverResult::Optimal(tour) | SolverResult::Feasible(tour) => Some(tour),
            SolverResult::Unknown => None,
        }
    }
}

impl std::fmt::Display for SolverResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Optimal(tour) => write!(f, "Optimal(length={})", tour.length()),
            SolverResult::Feasible(tour) => write!(f, "Feasible(length={})", tour.length()),
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The search tree was exhausted, so the best tour is optimal.
    OptimalityProven,
    /// The solver aborted due to a search limit (time, interrupt).
    /// The string describes the limit.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome {
    pub result: SolverResult,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}

impl SolverOutcome {
    #[inline]
    pub fn new(result: SolverResult, reason: TerminationReason, statistics: SolverStatistics) -> Self {
        Self {
            result,
            reason,
            statistics,
        }
    }

    /// An exhausted search with its best tour.
    #[inline]
    pub fn optimal(tour: Tour, statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Optimal(tour),
            TerminationReason::OptimalityProven,
            statistics,
        )
    }

    /// An aborted search that still found a tour.
    #[inline]
    pub fn feasible<R>(tour: Tour, reason: R, statistics: SolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self::new(
            SolverResult::Feasible(tour),
            TerminationReason::Aborted(reason.into()),
            statistics,
        )
    }

    /// An aborted search without a tour.
    #[inline]
    pub fn unknown<R>(reason: R, statistics: SolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self::new(
            SolverResult::Unknown,
            TerminationReason::Aborted(reason.into()),
            statistics,
        )
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self.result, SolverResult::Feasible(_))
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        self.result.tour().is_some()
    }

    #[inline]
    pub fn tour(&self) -> Option<&Tour> {
        self.result.tour()
    }
}

impl std::fmt::Display for SolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result:      {}", self.result)?;
        writeln!(f, "Termination: {}", self.reason)?;
        if let Some(tour) = self.tour() {
            writeln!(f, "Tour:        {}", tour)?;
        }
        write!(f, "{}", self.statistics)
    }
}
