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

/// A composite monitor that aggregates multiple monitors and forwards events to all of them.
///
/// `search_command` returns the first `Terminate` in insertion order.
pub struct CompositeMonitor<'a> {
    monitors: Vec<Box<dyn SearchMonitor + 'a>>,
}

impl std::fmt::Debug for CompositeMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMonitor")
            .field("monitors", &self.names().join(", "))
            .finish()
    }
}

impl std::fmt::Display for CompositeMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompositeMonitor([{}])", self.names().join(", "))
    }
}

impl Default for CompositeMonitor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CompositeMonitor<'a> {
    /// Creates a new empty `CompositeMonitor`.
    #[inline]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Creates a new `CompositeMonitor` with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Adds a new boxed monitor to the composite monitor.
    #[inline]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn SearchMonitor + 'a>) {
        self.monitors.push(monitor);
    }

    /// Returns the number of monitors in the composite monitor.
    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if the composite monitor contains no monitors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    fn names(&self) -> Vec<&str> {
        self.monitors.iter().map(|m| m.name()).collect()
    }
}

impl<'a> FromIterator<Box<dyn SearchMonitor + 'a>> for CompositeMonitor<'a> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn SearchMonitor + 'a>>,
    {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl SearchMonitor for CompositeMonitor<'_> {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_search(&mut self, graph: &Graph) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(graph);
        }
    }

    fn on_exit_search(&mut self) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search();
        }
    }

    fn on_solution_found(&mut self, tour: &PathState<'_>) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(tour);
        }
    }

    fn on_step(&mut self) {
        for monitor in &mut self.monitors {
            monitor.on_step();
        }
    }

    fn search_command(&self) -> SearchCommand {
        // Called for every node; a plain loop avoids building an iterator adaptor.
        for monitor in &self.monitors {
            if let SearchCommand::Terminate(reason) = monitor.search_command() {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::interrupt::InterruptMonitor;
    use salesman_model::index::NodeIndex;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Events {
        enter: usize,
        exit: usize,
        steps: usize,
        solutions: Vec<u64>,
    }

    struct Recording {
        name: &'static str,
        events: Rc<RefCell<Events>>,
        command: SearchCommand,
    }

    impl SearchMonitor for Recording {
        fn name(&self) -> &str {
            self.name
        }
        fn on_enter_search(&mut self, _graph: &Graph) {
            self.events.borrow_mut().enter += 1;
        }
        fn on_exit_search(&mut self) {
            self.events.borrow_mut().exit += 1;
        }
        fn on_solution_found(&mut self, tour: &PathState<'_>) {
            self.events.borrow_mut().solutions.push(tour.total_distance());
        }
        fn on_step(&mut self) {
            self.events.borrow_mut().steps += 1;
        }
        fn search_command(&self) -> SearchCommand {
            self.command.clone()
        }
    }

    fn recording(
        name: &'static str,
        command: SearchCommand,
    ) -> (Recording, Rc<RefCell<Events>>) {
        let events = Rc::new(RefCell::new(Events::default()));
        let monitor = Recording {
            name,
            events: Rc::clone(&events),
            command,
        };
        (monitor, events)
    }

    #[test]
    fn test_empty_composite_continues() {
        let composite = CompositeMonitor::new();
        assert!(composite.is_empty());
        assert_eq!(composite.search_command(), SearchCommand::Continue);
        assert_eq!(composite.to_string(), "CompositeMonitor([])");
    }

    #[test]
    fn test_events_are_forwarded_to_every_monitor() {
        let graph = Graph::from_matrix(2, vec![0, 7, 7, 0]).unwrap();
        let (a, a_events) = recording("A", SearchCommand::Continue);
        let (b, b_events) = recording("B", SearchCommand::Continue);
        let mut composite = CompositeMonitor::with_capacity(2);
        composite.add_monitor(a);
        composite.add_monitor_boxed(Box::new(b));
        assert_eq!(composite.len(), 2);
        assert_eq!(composite.to_string(), "CompositeMonitor([A, B])");

        let mut tour = PathState::new(&graph);
        for i in [0, 1, 0] {
            tour.add(NodeIndex::new(i));
        }

        composite.on_enter_search(&graph);
        composite.on_step();
        composite.on_step();
        composite.on_solution_found(&tour);
        composite.on_exit_search();

        for events in [a_events, b_events] {
            let events = events.borrow();
            assert_eq!(events.enter, 1);
            assert_eq!(events.steps, 2);
            assert_eq!(events.solutions, vec![14]);
            assert_eq!(events.exit, 1);
        }
    }

    #[test]
    fn test_first_terminate_wins() {
        let (a, _) = recording("A", SearchCommand::Continue);
        let (b, _) = recording("B", SearchCommand::Terminate("b".into()));
        let (c, _) = recording("C", SearchCommand::Terminate("c".into()));
        let composite: CompositeMonitor = [a, b, c]
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn SearchMonitor>)
            .collect();
        assert_eq!(composite.search_command(), SearchCommand::Terminate("b".into()));
    }

    #[test]
    fn test_borrowed_interrupt_monitor() {
        let flag = AtomicBool::new(false);
        let mut composite = CompositeMonitor::new();
        composite.add_monitor(InterruptMonitor::new(&flag));
        assert_eq!(composite.search_command(), SearchCommand::Continue);
        flag.store(true, Ordering::Relaxed);
        assert!(matches!(composite.search_command(), SearchCommand::Terminate(_)));
    }
}
