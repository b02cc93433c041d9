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

//! # Salesman Branch-and-Bound
//!
//! An exact, multi-threaded branch-and-bound search for the symmetric
//! travelling salesman problem. Workers share a lock-free queue of partial
//! tours and a single best bound; shallow partial tours are distributed
//! through the queue, deep ones are searched depth-first by the worker that
//! owns them.
//!
//! - `bnb`: `BnbSolver`, which seeds the queue, runs the workers and merges
//!   their results.
//! - `config`: `BnbSolverConfig` and the default depth threshold.
//! - `context`: `SearchContext`, the state all workers share.
//! - `worker`: the per-thread search loop.
//! - `monitor`: `TreeSearchMonitor` and its implementations.
//! - `result`: `BnbSolverOutcome`.
//! - `stats`: per-worker counters and the exhaustiveness check.

pub mod bnb;
pub mod config;
pub mod context;
pub mod monitor;
pub mod result;
pub mod stats;
pub mod worker;
