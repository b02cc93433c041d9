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

//! # Lock-Free MPMC Queue
//!
//! An unbounded multi-producer / multi-consumer FIFO following the two-pointer
//! Michael–Scott algorithm, with every link and both anchors held in
//! `StampedCell`s.
//!
//! ## Algorithm
//!
//! - A sentinel node always sits at `head`, so `head` and `tail` always
//!   reference a node. The value of a queue entry lives in the node *after*
//!   the sentinel.
//! - `enqueue` links a new node at `tail.next` with a CAS and then tries once
//!   to swing `tail` forward. If that swing loses, whoever next observes the
//!   lagging tail helps it along, so `tail` trails the last node by at most one.
//! - `dequeue` advances `head` to `head.next` with a CAS; the winner moves the
//!   value out of the node that just became the new sentinel.
//!
//! ## Reclamation
//!
//! Nodes are allocated from the queue's own `SlotTable` and released only when
//! the queue is dropped. A thread holding a stale `head` or `next` reference
//! therefore always reads a live node, and stamps make any CAS based on such
//! a stale read fail. Values are moved out at dequeue time; what remains
//! allocated per dequeued entry is the node shell (a stamp word and an empty
//! value slot).
//!
//! ## Usage
//!
//! ```rust
//! use salesman_sync::queue::{ConcurrentQueue, QueueEmpty};
//!
//! let queue = ConcurrentQueue::new();
//! queue.enqueue(1);
//! queue.enqueue(2);
//! assert_eq!(queue.dequeue(), Ok(1));
//! assert_eq!(queue.dequeue(), Ok(2));
//! assert_eq!(queue.dequeue(), Err(QueueEmpty));
//! ```

use crate::slot::{SlotRef, SlotTable};
use crate::stamped::StampedCell;
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

/// Returned by `ConcurrentQueue::dequeue` when no entry is visible.
///
/// This is a control-flow signal rather than a failure: a producer may
/// enqueue right after it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("queue is empty")]
pub struct QueueEmpty;

struct Node<T> {
    /// Initialised from enqueue until the dequeuer that makes this node the
    /// sentinel moves the value out. Never initialised for the first sentinel.
    value: UnsafeCell<MaybeUninit<T>>,
    next: StampedCell<Node<T>>,
}

impl<T> Node<T> {
    #[inline]
    fn sentinel() -> Self {
        Self {
            value: UnsafeCell::new(MaybeUninit::uninit()),
            next: StampedCell::new(),
        }
    }

    #[inline]
    fn with_value(value: T) -> Self {
        Self {
            value: UnsafeCell::new(MaybeUninit::new(value)),
            next: StampedCell::new(),
        }
    }
}

/// An unbounded lock-free FIFO queue.
pub struct ConcurrentQueue<T> {
    head: CachePadded<StampedCell<Node<T>>>,
    tail: CachePadded<StampedCell<Node<T>>>,
    nodes: SlotTable<Node<T>>,
}

// SAFETY: values are moved in by `enqueue` and out by exactly one `dequeue`,
// so sharing the queue only ever transfers `T` between threads.
unsafe impl<T: Send> Send for ConcurrentQueue<T> {}
// SAFETY: see above; no `&T` is ever handed out.
unsafe impl<T: Send> Sync for ConcurrentQueue<T> {}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentQueue<T> {
    /// Creates an empty queue holding only the sentinel node.
    pub fn new() -> Self {
        let nodes = SlotTable::new();
        let sentinel = nodes.insert(Node::sentinel());
        Self {
            head: CachePadded::new(StampedCell::with(Some(sentinel), 0)),
            tail: CachePadded::new(StampedCell::with(Some(sentinel), 0)),
            nodes,
        }
    }

    #[inline(always)]
    fn node(&self, slot: SlotRef<Node<T>>) -> &Node<T> {
        // SAFETY: every `SlotRef<Node<T>>` this queue handles was issued by
        // `self.nodes` and acquired through a `StampedCell` load, and nodes
        // are never freed before the queue.
        unsafe { self.nodes.get(slot) }
    }

    /// Loads `head` or `tail`, which always reference a node.
    #[inline(always)]
    fn anchor(cell: &StampedCell<Node<T>>) -> (SlotRef<Node<T>>, u32) {
        match cell.load() {
            (Some(slot), stamp) => (slot, stamp),
            (None, _) => unreachable!("queue anchors always reference the sentinel or a later node"),
        }
    }

    /// Appends `value` at the tail.
    pub fn enqueue(&self, value: T) {
        let node = self.nodes.insert(Node::with_value(value));

        loop {
            let (tail, tail_stamp) = Self::anchor(&self.tail);
            let (next, next_stamp) = self.node(tail).next.load();

            // Re-verify that `next` was read from the current tail.
            if self.tail.load() != (Some(tail), tail_stamp) {
                continue;
            }

            match next {
                None => {
                    if self.node(tail).next.compare_and_swap(
                        None,
                        Some(node),
                        next_stamp,
                        next_stamp.wrapping_add(1),
                    ) {
                        // Best effort; a later operation helps if this fails.
                        let _ = self.tail.compare_and_swap(
                            Some(tail),
                            Some(node),
                            tail_stamp,
                            tail_stamp.wrapping_add(1),
                        );
                        return;
                    }
                }
                Some(next) => {
                    // The tail lags behind the last node; help it forward.
                    let _ = self.tail.compare_and_swap(
                        Some(tail),
                        Some(next),
                        tail_stamp,
                        tail_stamp.wrapping_add(1),
                    );
                }
            }
        }
    }

    /// Removes and returns the value at the head, or `QueueEmpty` if no entry
    /// is visible at this moment.
    pub fn dequeue(&self) -> Result<T, QueueEmpty> {
        loop {
            let (head, head_stamp) = Self::anchor(&self.head);
            let (tail, tail_stamp) = Self::anchor(&self.tail);
            let (next, _) = self.node(head).next.load();

            // Re-verify that the three reads form a consistent snapshot.
            if self.head.load() != (Some(head), head_stamp) {
                continue;
            }

            if head == tail {
                match next {
                    None => return Err(QueueEmpty),
                    Some(next) => {
                        let _ = self.tail.compare_and_swap(
                            Some(tail),
                            Some(next),
                            tail_stamp,
                            tail_stamp.wrapping_add(1),
                        );
                    }
                }
                continue;
            }

            let Some(next) = next else {
                continue;
            };

            if self.head.compare_and_swap(
                Some(head),
                Some(next),
                head_stamp,
                head_stamp.wrapping_add(1),
            ) {
                // SAFETY: winning the head CAS makes this thread the only one
                // that turned `next` into the sentinel, and `head` never moves
                // backwards, so no other thread reads this value. The value was
                // written before `next` was published by a release CAS that our
                // acquire load of `head.next` synchronised with.
                let value = unsafe { (*self.node(next).value.get()).assume_init_read() };
                return Ok(value);
            }
        }
    }

    /// Returns `true` if the queue held no entry at the instant of the check.
    ///
    /// Another thread may enqueue right after this returns `true`.
    pub fn is_empty(&self) -> bool {
        let (head, _) = Self::anchor(&self.head);
        let (tail, _) = Self::anchor(&self.tail);
        head == tail && self.node(head).next.load().0.is_none()
    }

    /// Returns the number of nodes allocated over the queue's lifetime,
    /// including the initial sentinel. Useful to bound the memory retained by
    /// deferred reclamation.
    pub fn allocated_nodes(&self) -> usize {
        self.nodes.len()
    }
}

impl<T> Drop for ConcurrentQueue<T> {
    fn drop(&mut self) {
        // Every node after the sentinel still owns its value.
        let (mut current, _) = Self::anchor(&self.head);
        while let (Some(next), _) = self.node(current).next.load() {
            // SAFETY: `&mut self` rules out concurrent dequeuers, and nodes
            // after the sentinel hold initialised values.
            unsafe { (*self.node(next).value.get()).assume_init_drop() };
            current = next;
        }
    }
}

impl<T> std::fmt::Debug for ConcurrentQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentQueue")
            .field("head", &*self.head)
            .field("tail", &*self.tail)
            .field("allocated_nodes", &self.allocated_nodes())
            .finish()
    }
}
