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

use std::time::Duration;

/// Statistics collected during the solving process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Number of shorter tours installed during the solving process.
    pub solutions_found: u64,
    /// Number of worker threads used during the solving process.
    pub used_threads: usize,
    /// Number of closed tours that were evaluated.
    pub paths_verified: u64,
    /// Number of partial tours discarded by the bound.
    pub prunings: u64,
    /// Total duration of the solving process.
    pub solve_duration: Duration,
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Statistics:")?;
        writeln!(f, "  Solutions Found: {}", self.solutions_found)?;
        writeln!(f, "  Used Threads: {}", self.used_threads)?;
        writeln!(f, "  Paths Verified: {}", self.paths_verified)?;
        writeln!(f, "  Prunings: {}", self.prunings)?;
        writeln!(
            f,
            "  Solve Duration (secs): {:.3}",
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Builder for `SolverStatistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatisticsBuilder {
    solutions_found: u64,
    used_threads: usize,
    paths_verified: u64,
    prunings: u64,
    solve_duration: Duration,
}

impl Default for SolverStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverStatisticsBuilder {
    /// Creates a new `SolverStatisticsBuilder` with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            solutions_found: 0,
            used_threads: 1,
            paths_verified: 0,
            prunings: 0,
            solve_duration: Duration::ZERO,
        }
    }

    /// Sets the number of solutions found.
    #[inline]
    pub fn solutions_found(mut self, solutions_found: u64) -> Self {
        self.solutions_found = solutions_found;
        self
    }

    /// Sets the number of threads used.
    #[inline]
    pub fn used_threads(mut self, used_threads: usize) -> Self {
        self.used_threads = used_threads;
        self
    }

    /// Sets the number of evaluated closed tours.
    #[inline]
    pub fn paths_verified(mut self, paths_verified: u64) -> Self {
        self.paths_verified = paths_verified;
        self
    }

    /// Sets the number of pruned partial tours.
    #[inline]
    pub fn prunings(mut self, prunings: u64) -> Self {
        self.prunings = prunings;
        self
    }

    /// Sets the total solve duration.
    #[inline]
    pub fn solve_duration(mut self, solve_duration: Duration) -> Self {
        self.solve_duration = solve_duration;
        self
    }

    /// Builds the `SolverStatistics` instance.
    #[inline]
    pub fn build(self) -> SolverStatistics {
        SolverStatistics {
            solutions_found: self.solutions_found,
            used_threads: self.used_threads,
            paths_verified: self.paths_verified,
            prunings: self.prunings,
            solve_duration: self.solve_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SolverStatistics;
    use super::SolverStatisticsBuilder;
    use std::time::Duration;

    #[test]
    fn builder_constructs_expected_struct() {
        let stats = SolverStatisticsBuilder::new()
            .solutions_found(3)
            .used_threads(8)
            .paths_verified(5040)
            .prunings(17)
            .solve_duration(Duration::from_millis(1234))
            .build();
        assert_eq!(stats.solutions_found, 3);
        assert_eq!(stats.used_threads, 8);
        assert_eq!(stats.paths_verified, 5040);
        assert_eq!(stats.prunings, 17);
        assert_eq!(stats.solve_duration, Duration::from_millis(1234));
    }

    #[test]
    fn test_display_formats_all_fields() {
        let stats = SolverStatistics {
            solutions_found: 2,
            used_threads: 4,
            paths_verified: 6,
            prunings: 1,
            solve_duration: Duration::from_millis(1234),
        };
        let rendered = format!("{}", stats);
        assert!(rendered.contains("Solver Statistics:"), "missing header");
        assert!(rendered.contains("Solutions Found: 2"));
        assert!(rendered.contains("Used Threads: 4"));
        assert!(rendered.contains("Paths Verified: 6"));
        assert!(rendered.contains("Prunings: 1"));
        assert!(
            rendered.contains("Solve Duration (secs): 1.234"),
            "duration not formatted to 3 decimals"
        );
    }

    #[test]
    fn test_default_builder_uses_one_thread() {
        let stats = SolverStatisticsBuilder::default().build();
        assert_eq!(stats.used_threads, 1);
        assert_eq!(stats.solutions_found, 0);
        assert_eq!(stats.solve_duration, Duration::ZERO);
        assert!(format!("{}", stats).contains("Solve Duration (secs): 0.000"));
    }
}
