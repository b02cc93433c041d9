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

//! # Stable Slot Table
//!
//! An append-only, lock-free arena whose slots never move once allocated. It
//! is the backing store that lets `StampedCell` express a reference as a
//! 32-bit slot number instead of a pointer, so that reference and stamp fit in
//! one 64-bit word and can be swapped by a single hardware CAS.
//!
//! ## Layout
//!
//! Slots live in segments that double in size: segment `s` holds
//! `BASE_SLOTS << s` slots. Slot `i` is found by a leading-zero count, and a
//! segment is allocated lazily by whichever thread first needs it (losers of
//! the allocation race free their copy). Segments are only released when the
//! table is dropped, which is what makes a stale `SlotRef` always point at
//! live memory for the table's lifetime.
//!
//! ## Usage
//!
//! ```rust
//! use salesman_sync::slot::SlotTable;
//!
//! let table = SlotTable::new();
//! let a = table.insert(String::from("a"));
//! let b = table.insert(String::from("b"));
//! // SAFETY: both references were produced by `table`.
//! unsafe {
//!     assert_eq!(table.get(a), "a");
//!     assert_eq!(table.get(b), "b");
//! }
//! assert_eq!(table.len(), 2);
//! ```

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

const BASE_SHIFT: u32 = 5;
const BASE_SLOTS: usize = 1 << BASE_SHIFT;
/// Enough segments to address every `u32` slot number.
const SEGMENTS: usize = (u32::BITS - BASE_SHIFT + 1) as usize;
/// The largest slot number a `SlotRef` can carry. `u32::MAX` is kept free so
/// that `index + 1` still fits when encoded next to a stamp.
pub const MAX_SLOTS: usize = u32::MAX as usize;

/// A handle to a slot inside a `SlotTable<T>`.
///
/// The handle is a plain 32-bit slot number. It is `Copy` regardless of `T`
/// and carries no lifetime; reading through it requires the table that issued
/// it, see `SlotTable::get`.
pub struct SlotRef<T> {
    index: u32,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> SlotRef<T> {
    #[inline(always)]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self {
            index,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the slot number.
    #[inline(always)]
    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl<T> Clone for SlotRef<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotRef<T> {}

impl<T> PartialEq for SlotRef<T> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for SlotRef<T> {}

impl<T> std::hash::Hash for SlotRef<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> std::fmt::Debug for SlotRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SlotRef({})", self.index)
    }
}

impl<T> std::fmt::Display for SlotRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SlotRef({})", self.index)
    }
}

type Slot<T> = UnsafeCell<MaybeUninit<T>>;

/// Maps a slot number to `(segment, offset)`.
#[inline(always)]
fn locate(index: usize) -> (usize, usize) {
    let biased = index + BASE_SLOTS;
    let segment = (usize::BITS - 1 - biased.leading_zeros() - BASE_SHIFT) as usize;
    let offset = biased - (BASE_SLOTS << segment);
    (segment, offset)
}

#[inline(always)]
const fn segment_len(segment: usize) -> usize {
    BASE_SLOTS << segment
}

/// An append-only, lock-free table of write-once slots with stable addresses.
///
/// Every slot below `len()` holds an initialised value that lives until the
/// table is dropped. Slots are never reused, so a `SlotRef` can never observe
/// a different value than the one it was issued for.
pub struct SlotTable<T> {
    segments: [AtomicPtr<Slot<T>>; SEGMENTS],
    next: AtomicUsize,
}

// SAFETY: the table owns its values; moving it moves ownership of every `T`.
unsafe impl<T: Send> Send for SlotTable<T> {}
// SAFETY: shared access hands out `&T` (requires `T: Sync`) and `insert`
// moves values in from any thread (requires `T: Send`).
unsafe impl<T: Send + Sync> Sync for SlotTable<T> {}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotTable<T> {
    /// Creates an empty table. No memory is allocated until the first insert.
    #[inline]
    pub fn new() -> Self {
        Self {
            segments: std::array::from_fn(|_| AtomicPtr::new(ptr::null_mut())),
            next: AtomicUsize::new(0),
        }
    }

    /// Returns the number of slots handed out so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.next.load(Ordering::Acquire).min(MAX_SLOTS)
    }

    /// Returns `true` if no slot has been handed out yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves `value` into a fresh slot and returns its handle.
    ///
    /// The value is fully written before this returns; publishing the handle
    /// to other threads through a release store (for example a
    /// `StampedCell` CAS) makes the value visible to them.
    ///
    /// # Panics
    ///
    /// Panics if all `MAX_SLOTS` slots have been handed out.
    pub fn insert(&self, value: T) -> SlotRef<T> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        assert!(
            index < MAX_SLOTS,
            "called `SlotTable::insert` on a table that already holds {} slots",
            MAX_SLOTS
        );

        let (segment, offset) = locate(index);
        let base = self.segment(segment);

        // SAFETY: `offset < segment_len(segment)` by construction of `locate`,
        // and `index` was claimed exclusively by the `fetch_add` above, so no
        // other thread reads or writes this slot before the handle escapes.
        unsafe {
            (*(*base.add(offset)).get()).write(value);
        }

        SlotRef::from_index(index as u32)
    }

    /// Returns a shared reference to the value behind `slot`.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if `slot` lies beyond the slots handed out so far.
    ///
    /// # Safety
    ///
    /// `slot` must have been returned by `insert` on this table, and the
    /// caller must have synchronised with that insert (acquired the handle
    /// through the cell it was published in).
    #[inline]
    pub unsafe fn get(&self, slot: SlotRef<T>) -> &T {
        let index = slot.index() as usize;
        debug_assert!(
            index < self.next.load(Ordering::Relaxed),
            "called `SlotTable::get` with slot out of bounds: the len is {} but the index is {}",
            self.next.load(Ordering::Relaxed),
            index
        );

        let (segment, offset) = locate(index);
        let base = self.segments[segment].load(Ordering::Acquire);
        debug_assert!(!base.is_null());

        // SAFETY: the caller guarantees the slot was initialised by `insert`
        // and that the write happens-before this read.
        unsafe { (*(*base.add(offset)).get()).assume_init_ref() }
    }

    /// Returns the segment base pointer, allocating the segment if needed.
    fn segment(&self, segment: usize) -> *mut Slot<T> {
        let current = self.segments[segment].load(Ordering::Acquire);
        if !current.is_null() {
            return current;
        }

        let fresh: Box<[Slot<T>]> = (0..segment_len(segment))
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        let fresh = Box::into_raw(fresh).cast::<Slot<T>>();

        match self.segments[segment].compare_exchange(
            ptr::null_mut(),
            fresh,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => fresh,
            Err(winner) => {
                // SAFETY: `fresh` was never shared; rebuild the box we leaked above.
                unsafe { free_segment(fresh, segment) };
                winner
            }
        }
    }
}

/// Frees a segment allocation without dropping any slot contents.
///
/// # Safety
///
/// `base` must come from `Box::<[Slot<T>]>::into_raw` with `segment_len(segment)`
/// elements and must not be used afterwards.
unsafe fn free_segment<T>(base: *mut Slot<T>, segment: usize) {
    let slice = ptr::slice_from_raw_parts_mut(base, segment_len(segment));
    drop(unsafe { Box::from_raw(slice) });
}

impl<T> Drop for SlotTable<T> {
    fn drop(&mut self) {
        let len = self.len();
        for index in 0..len {
            let (segment, offset) = locate(index);
            let base = *self.segments[segment].get_mut();
            if base.is_null() {
                continue;
            }
            // SAFETY: every slot below `len` was written by `insert` and we
            // hold the only reference to the table.
            unsafe { (*base.add(offset)).get_mut().assume_init_drop() };
        }

        for (segment, base) in self.segments.iter_mut().enumerate() {
            let base = *base.get_mut();
            if !base.is_null() {
                // SAFETY: installed by `segment` from a boxed slice of this length.
                unsafe { free_segment(base, segment) };
            }
        }
    }
}

impl<T> std::fmt::Debug for SlotTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotTable").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_locate_segment_boundaries() {
        assert_eq!(locate(0), (0, 0));
        assert_eq!(locate(BASE_SLOTS - 1), (0, BASE_SLOTS - 1));
        assert_eq!(locate(BASE_SLOTS), (1, 0));
        assert_eq!(locate(3 * BASE_SLOTS - 1), (1, 2 * BASE_SLOTS - 1));
        assert_eq!(locate(3 * BASE_SLOTS), (2, 0));
        let (segment, offset) = locate(MAX_SLOTS - 1);
        assert!(segment < SEGMENTS);
        assert!(offset < segment_len(segment));
    }

    #[test]
    fn test_insert_and_get_across_segments() {
        let table = SlotTable::new();
        let refs: Vec<_> = (0..1_000u64).map(|i| table.insert(i * 3)).collect();
        assert_eq!(table.len(), 1_000);
        for (i, slot) in refs.iter().enumerate() {
            assert_eq!(slot.index() as usize, i);
            // SAFETY: issued by `table` on this thread.
            assert_eq!(unsafe { *table.get(*slot) }, i as u64 * 3);
        }
    }

    #[test]
    fn test_empty_table() {
        let table: SlotTable<String> = SlotTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_drop_runs_destructors_once() {
        struct Counted(Arc<AtomicUsize>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        {
            let table = SlotTable::new();
            for _ in 0..100 {
                table.insert(Counted(Arc::clone(&drops)));
            }
        }
        assert_eq!(drops.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_concurrent_inserts_are_distinct() {
        let table = SlotTable::new();
        let threads = 8;
        let per_thread = 2_000;

        let refs: Vec<Vec<(usize, SlotRef<usize>)>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let table = &table;
                    scope.spawn(move || {
                        (0..per_thread)
                            .map(|i| {
                                let value = t * per_thread + i;
                                (value, table.insert(value))
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(table.len(), threads * per_thread);
        let mut seen = std::collections::HashSet::new();
        for (value, slot) in refs.into_iter().flatten() {
            assert!(seen.insert(slot.index()), "slot {} handed out twice", slot);
            // SAFETY: issued by `table`; the scope join synchronises.
            assert_eq!(unsafe { *table.get(slot) }, value);
        }
    }
}
