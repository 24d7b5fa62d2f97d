// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The bump allocator itself.
//!
//! [`BumpArena`] manages a fixed, heap-backed byte region through a single
//! break offset. Allocation advances the offset by the 8-aligned request
//! size and hands out an [`ArenaBuf`] view of the claimed region. There is
//! no free path: the offset is monotonic for the arena's whole lifetime.

use crate::buf::ArenaBuf;
use crate::stats::ArenaStats;
use crate::{align_up, ArenaError, ARENA_ALIGN, MIN_CAPACITY};
use std::cell::UnsafeCell;
use std::sync::{Arc, Mutex};

/// Mutable arena bookkeeping, guarded by one mutex.
struct ArenaState {
    /// Current break offset in bytes from the start of the storage.
    brk: usize,
    stats: ArenaStats,
}

/// Shared arena storage and state. [`ArenaBuf`]s hold an `Arc` to this so
/// the backing region outlives every view carved from it.
pub(crate) struct ArenaInner {
    /// Backing storage as 64-bit words so the base address is 8-aligned.
    /// Regions handed out are disjoint byte ranges of this block.
    storage: UnsafeCell<Box<[u64]>>,
    capacity: usize,
    zero_on_alloc: bool,
    state: Mutex<ArenaState>,
}

// ArenaInner is shared across threads behind Arc. All mutation of `brk`
// goes through the mutex, and every ArenaBuf owns a disjoint, never-reused
// byte range, so concurrent access to `storage` cannot alias.
unsafe impl Send for ArenaInner {}
unsafe impl Sync for ArenaInner {}

impl ArenaInner {
    /// Base pointer of the backing storage.
    ///
    /// The box is never reallocated, so the address is stable for the
    /// arena's lifetime.
    pub(crate) fn base_ptr(&self) -> *mut u8 {
        // SAFETY: the pointer is only used to derive disjoint sub-regions;
        // the box itself is never moved or dropped while an Arc exists.
        unsafe { (*self.storage.get()).as_mut_ptr() as *mut u8 }
    }
}

/// A one-way bump allocator over a fixed-capacity region.
///
/// # Example
/// ```
/// use mem_arena::{BumpArena, ArenaError};
///
/// let arena = BumpArena::with_capacity(256).unwrap();
/// let buf = arena.alloc(100).unwrap();
/// assert_eq!(buf.len(), 100);
///
/// // No free exists: capacity only ever shrinks.
/// drop(buf);
/// assert!(arena.used() >= 100);
///
/// // Exhaustion is an error, not a panic.
/// assert!(matches!(arena.alloc(1024), Err(ArenaError::Exhausted { .. })));
/// ```
pub struct BumpArena {
    inner: Arc<ArenaInner>,
}

impl BumpArena {
    /// Creates an arena managing `capacity` bytes.
    ///
    /// Fails with [`ArenaError::CapacityTooSmall`] below [`MIN_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        Self::new_inner(capacity, false)
    }

    /// Like [`with_capacity`](Self::with_capacity), but zero-fills every
    /// region at allocation time.
    pub fn with_capacity_zeroing(capacity: usize) -> Result<Self, ArenaError> {
        Self::new_inner(capacity, true)
    }

    fn new_inner(capacity: usize, zero_on_alloc: bool) -> Result<Self, ArenaError> {
        if capacity < MIN_CAPACITY {
            return Err(ArenaError::CapacityTooSmall {
                capacity,
                minimum: MIN_CAPACITY,
            });
        }

        let words = align_up(capacity) / ARENA_ALIGN;
        let storage = vec![0u64; words].into_boxed_slice();

        tracing::debug!(capacity, zero_on_alloc, "bump arena created");

        Ok(Self {
            inner: Arc::new(ArenaInner {
                storage: UnsafeCell::new(storage),
                capacity,
                zero_on_alloc,
                state: Mutex::new(ArenaState {
                    brk: 0,
                    stats: ArenaStats::default(),
                }),
            }),
        })
    }

    /// Allocates `size` bytes, aligned up to 8.
    ///
    /// The returned [`ArenaBuf`] owns its region for the process lifetime.
    /// Errors are terminal for the region of capacity involved: there is
    /// no retry that can succeed after [`ArenaError::Exhausted`] short of
    /// asking for less.
    pub fn alloc(&self, size: usize) -> Result<ArenaBuf, ArenaError> {
        let mut state = self
            .inner
            .state
            .lock()
            .expect("arena state lock poisoned");

        if size == 0 {
            state.stats.record_failure();
            return Err(ArenaError::ZeroSizedAllocation);
        }

        let aligned = align_up(size);
        let available = self.inner.capacity - state.brk;
        if aligned > available {
            state.stats.record_failure();
            return Err(ArenaError::Exhausted {
                requested_bytes: size,
                aligned_bytes: aligned,
                available_bytes: available,
                capacity_bytes: self.inner.capacity,
            });
        }

        let offset = state.brk;
        state.brk += aligned;
        let new_brk = state.brk;
        state.stats.record_alloc(aligned, new_brk);
        drop(state);

        let buf = ArenaBuf::new(Arc::clone(&self.inner), offset, size);
        if self.inner.zero_on_alloc {
            let mut buf = buf;
            buf.fill(0);
            return Ok(buf);
        }
        Ok(buf)
    }

    /// Bytes consumed so far (break offset).
    pub fn used(&self) -> usize {
        self.inner.state.lock().expect("arena state lock poisoned").brk
    }

    /// Bytes still available for allocation.
    pub fn remaining(&self) -> usize {
        self.inner.capacity - self.used()
    }

    /// Total managed capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Snapshot of allocation statistics.
    pub fn stats(&self) -> ArenaStats {
        self.inner
            .state
            .lock()
            .expect("arena state lock poisoned")
            .stats
            .clone()
    }
}

impl Clone for BumpArena {
    /// Clones share the same storage and break offset.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for BumpArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BumpArena")
            .field("capacity", &self.inner.capacity)
            .field("used", &self.used())
            .field("remaining", &self.remaining())
            .finish()
    }
}
