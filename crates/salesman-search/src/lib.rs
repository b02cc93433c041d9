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

//! # Salesman Search
//!
//! Engine-independent pieces shared by every search strategy of the solver.
//!
//! - `bound`: `BestBound`, the process-wide best tour, updated by a stamped
//!   compare-and-swap so the tour and its length always change together.
//! - `monitor`: the `SearchMonitor` trait plus time limit, interrupt and
//!   composite monitors that decide when a search has to stop.
//! - `result`: `SolverResult`, `TerminationReason` and `SolverOutcome`.
//! - `stats`: `SolverStatistics` and its builder.

pub mod bound;
pub mod monitor;
pub mod result;
pub mod stats;
