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

//! # Search Monitors
//!
//! Pluggable observers and controllers for search lifecycle events. Monitors
//! can track progress, enforce budgets and issue termination commands without
//! entangling those concerns with the worker loop.
//!
//! Every worker thread owns its own monitor stack, so monitors take `&mut self`
//! and need not be thread-safe. Cross-thread signals (an interrupt flag) are
//! shared by reference.
//!
//! ## Submodules
//!
//! - `search_monitor`: the `SearchMonitor` trait and the `SearchCommand` enum.
//! - `composite`: aggregate several monitors into one.
//! - `interrupt`: stop when a shared `AtomicBool` is raised.
//! - `time_limit`: stop after a wall-clock budget, checked every few thousand steps.

pub mod composite;
pub mod interrupt;
pub mod search_monitor;
pub mod time_limit;
