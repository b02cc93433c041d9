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

//! # Salesman Solver
//!
//! High-level entry point of the solver. `SolverBuilder` collects the run
//! settings (workers, depth threshold, pruning, time limit, progress logging)
//! and produces a `Solver`, which hands a graph to the parallel
//! branch-and-bound engine and reports a `SolverOutcome`.
//!
//! The `salesman` binary of this crate loads a TSPLIB-style instance and
//! prints the optimal tour.
//!
//! ## Usage
//!
//! ```rust
//! use salesman_model::graph::Graph;
//! use salesman_solver::solver::SolverBuilder;
//!
//! let graph = Graph::random_euclidean(6, 42);
//! let solver = SolverBuilder::new().with_workers(2).build();
//! let outcome = solver.solve(&graph);
//! assert!(outcome.is_optimal());
//! ```

pub mod solver;
