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

//! # Stamped References
//!
//! `StampedCell<T>` holds a `(reference, stamp)` pair that is loaded, compared
//! and replaced as one indivisible unit. The reference is an optional
//! `SlotRef<T>` into a `SlotTable<T>`; the stamp is a generation counter that
//! every successful update increments. Comparing both components defeats the
//! ABA hazard: a reference that went `A -> B -> A` carries a different stamp the
//! second time around, so a CAS that only remembers `A` fails.
//!
//! ## Encoding
//!
//! Both halves share one `AtomicU64`:
//!
//! ```raw
//! [ slot + 1 : 32 bits | stamp : 32 bits ]      slot field 0 = no reference
//! ```
//!
//! so a single hardware CAS covers the pair on every platform with 64-bit
//! atomics. The stamp wraps after `2^32` updates.
//!
//! ## Memory ordering
//!
//! Loads acquire and successful CASes release, because publishing a slot
//! through the cell is what makes the slot's contents visible to readers.
//!
//! ## Usage
//!
//! ```rust
//! use salesman_sync::slot::SlotTable;
//! use salesman_sync::stamped::StampedCell;
//!
//! let table = SlotTable::new();
//! let a = table.insert(1u64);
//! let b = table.insert(2u64);
//!
//! let cell = StampedCell::new();
//! cell.store(Some(a), 0);
//!
//! let (current, stamp) = cell.load();
//! assert!(cell.compare_and_swap(current, Some(b), stamp, stamp + 1));
//! // A stale CAS that still expects stamp 0 fails even though it names `b`.
//! assert!(!cell.compare_and_swap(Some(b), Some(a), stamp, stamp + 1));
//! ```

use crate::slot::SlotRef;
use std::sync::atomic::{AtomicU64, Ordering};

const STAMP_BITS: u32 = 32;
const STAMP_MASK: u64 = (1 << STAMP_BITS) - 1;

#[inline(always)]
fn encode<T>(reference: Option<SlotRef<T>>, stamp: u32) -> u64 {
    let slot = match reference {
        Some(r) => r.index() as u64 + 1,
        None => 0,
    };
    (slot << STAMP_BITS) | stamp as u64
}

#[inline(always)]
fn decode<T>(word: u64) -> (Option<SlotRef<T>>, u32) {
    let slot = word >> STAMP_BITS;
    let stamp = (word & STAMP_MASK) as u32;
    let reference = match slot {
        0 => None,
        s => Some(SlotRef::from_index((s - 1) as u32)),
    };
    (reference, stamp)
}

/// An atomically updatable `(reference, stamp)` pair.
pub struct StampedCell<T> {
    word: AtomicU64,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> Default for StampedCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StampedCell<T> {
    /// Creates a cell holding no reference and stamp 0.
    #[inline]
    pub const fn new() -> Self {
        Self {
            word: AtomicU64::new(0),
            _marker: std::marker::PhantomData,
        }
    }

    /// Creates a cell holding `reference` with the given stamp.
    #[inline]
    pub fn with(reference: Option<SlotRef<T>>, stamp: u32) -> Self {
        Self {
            word: AtomicU64::new(encode(reference, stamp)),
            _marker: std::marker::PhantomData,
        }
    }

    /// Reads the pair as one unit.
    #[inline(always)]
    pub fn load(&self) -> (Option<SlotRef<T>>, u32) {
        decode(self.word.load(Ordering::Acquire))
    }

    /// Replaces the pair iff both the reference and the stamp equal the
    /// expected values. Returns whether the swap happened.
    ///
    /// This is a retry primitive: on `false` the caller reloads and decides
    /// again, it never reports failure upward.
    #[inline(always)]
    pub fn compare_and_swap(
        &self,
        expected_reference: Option<SlotRef<T>>,
        new_reference: Option<SlotRef<T>>,
        expected_stamp: u32,
        new_stamp: u32,
    ) -> bool {
        self.word
            .compare_exchange(
                encode(expected_reference, expected_stamp),
                encode(new_reference, new_stamp),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Unconditionally writes the pair. Meant for initialisation, before the
    /// cell is shared.
    #[inline]
    pub fn store(&self, reference: Option<SlotRef<T>>, stamp: u32) {
        self.word.store(encode(reference, stamp), Ordering::Release);
    }
}

impl<T> std::fmt::Debug for StampedCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (reference, stamp) = self.load();
        f.debug_struct("StampedCell")
            .field("reference", &reference)
            .field("stamp", &stamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotTable;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_new_cell_is_empty() {
        let cell: StampedCell<u64> = StampedCell::new();
        assert_eq!(cell.load(), (None, 0));
    }

    #[test]
    fn test_encoding_keeps_slot_zero_distinct_from_none() {
        let zero = SlotRef::<u8>::from_index(0);
        assert_ne!(encode(Some(zero), 0), encode::<u8>(None, 0));
        assert_eq!(decode::<u8>(encode(Some(zero), 7)), (Some(zero), 7));
        let top = SlotRef::<u8>::from_index(u32::MAX - 1);
        assert_eq!(decode::<u8>(encode(Some(top), u32::MAX)), (Some(top), u32::MAX));
    }

    #[test]
    fn test_store_then_load() {
        let table = SlotTable::new();
        let a = table.insert(10u64);
        let cell = StampedCell::with(None, 3);
        assert_eq!(cell.load(), (None, 3));
        cell.store(Some(a), 9);
        assert_eq!(cell.load(), (Some(a), 9));
    }

    #[test]
    fn test_cas_succeeds_only_when_both_components_match() {
        let table = SlotTable::new();
        let a = table.insert(1u64);
        let b = table.insert(2u64);
        let cell = StampedCell::with(Some(a), 0);

        assert!(!cell.compare_and_swap(Some(b), Some(b), 0, 1), "wrong reference");
        assert!(!cell.compare_and_swap(Some(a), Some(b), 1, 2), "wrong stamp");
        assert_eq!(cell.load(), (Some(a), 0));

        assert!(cell.compare_and_swap(Some(a), Some(b), 0, 1));
        assert_eq!(cell.load(), (Some(b), 1));
    }

    #[test]
    fn test_aba_stale_cas_fails_after_reference_returns() {
        let table = SlotTable::new();
        let a = table.insert("a");
        let b = table.insert("b");
        let cell = StampedCell::with(Some(a), 0);

        // Thread 1 reads (a, 0) and is delayed.
        let (seen_reference, seen_stamp) = cell.load();

        // Meanwhile the cell goes a -> b -> a.
        assert!(cell.compare_and_swap(Some(a), Some(b), 0, 1));
        assert!(cell.compare_and_swap(Some(b), Some(a), 1, 2));
        assert_eq!(cell.load().0, seen_reference);

        // The reference matches again, the stamp does not.
        assert!(!cell.compare_and_swap(seen_reference, Some(b), seen_stamp, seen_stamp + 1));
        assert_eq!(cell.load(), (Some(a), 2));
    }

    #[test]
    fn test_concurrent_increments_lose_no_update() {
        let cell: StampedCell<u64> = StampedCell::new();
        let successes = AtomicU64::new(0);
        let threads = 8;
        let per_thread = 5_000;

        std::thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    for _ in 0..per_thread {
                        loop {
                            let (reference, stamp) = cell.load();
                            if cell.compare_and_swap(reference, reference, stamp, stamp + 1) {
                                successes.fetch_add(1, Ordering::Relaxed);
                                break;
                            }
                        }
                    }
                });
            }
        });

        assert_eq!(successes.load(Ordering::Relaxed), threads * per_thread);
        assert_eq!(cell.load().1 as u64, threads * per_thread);
    }
}
