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

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use salesman_model::{graph::Graph, path::PathState};
use std::sync::atomic::AtomicBool;

/// A search monitor that checks an atomic boolean flag to determine
/// whether the search should be interrupted.
#[derive(Debug, Clone)]
pub struct InterruptMonitor<'a> {
    stop_flag: &'a AtomicBool,
}

impl<'a> InterruptMonitor<'a> {
    /// Creates a new `InterruptMonitor` that monitors the given atomic boolean flag.
    /// The search will be terminated if the flag is set to `true`.
    #[inline(always)]
    pub fn new(stop_flag: &'a AtomicBool) -> Self {
        Self { stop_flag }
    }
}

impl SearchMonitor for InterruptMonitor<'_> {
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn on_enter_search(&mut self, _graph: &Graph) {}

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _tour: &PathState<'_>) {}

    fn on_step(&mut self) {}

    fn search_command(&self) -> SearchCommand {
        if self.stop_flag.load(std::sync::atomic::Ordering::Relaxed) {
            SearchCommand::Terminate("Interrupt signal received".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}
