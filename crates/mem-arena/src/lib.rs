// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # mem-arena
//!
//! A one-way "brk"-style bump allocator over a fixed-capacity memory region.
//! By "one-way" we mean there is no support for freeing individual
//! allocations: the break offset only ever moves forward. This is a
//! deliberate constraint, not a missing feature: on the embedded target this
//! models, every allocation lives for the lifetime of the process, which
//! buys O(1) allocation with zero fragmentation bookkeeping.
//!
//! # Key Components
//!
//! - [`BumpArena`]: the allocator. A fixed byte region, a monotonically
//!   advancing break offset, and 8-byte alignment on every allocation.
//! - [`ArenaBuf`]: an owned view of one allocated region. It keeps the
//!   arena storage alive via `Arc`, derefs to `[u8]`, and returns nothing
//!   on drop (the arena never reclaims).
//! - [`ArenaStats`]: cumulative allocator metrics (count, high-water mark,
//!   failures).
//!
//! # Ownership Model
//!
//! ```text
//! BumpArena::alloc(size)
//!       │
//!       ▼
//!    ArenaBuf  ◄─── disjoint region, holds Arc<ArenaInner>
//!       │
//!       │  drop()
//!       ▼
//!    nothing (capacity is never returned)
//! ```
//!
//! # Example
//! ```
//! use mem_arena::BumpArena;
//!
//! let arena = BumpArena::with_capacity(4096).unwrap();
//! let a = arena.alloc(100).unwrap();
//! let b = arena.alloc(20).unwrap();
//! assert_eq!(a.len(), 100);
//! assert_eq!(b.len(), 20);
//! // Sizes are aligned up to 8 internally: 104 + 24 consumed.
//! assert_eq!(arena.used(), 128);
//! ```

mod arena;
mod buf;
mod error;
mod stats;

pub use arena::BumpArena;
pub use buf::ArenaBuf;
pub use error::ArenaError;
pub use stats::ArenaStats;

/// Every allocation is aligned up to this boundary.
pub const ARENA_ALIGN: usize = 8;

/// Smallest capacity the arena accepts; anything below this could not even
/// hold the bookkeeping header of the original in-pool layout.
pub const MIN_CAPACITY: usize = 64;

/// Aligns `size` up to the next multiple of [`ARENA_ALIGN`].
pub(crate) fn align_up(size: usize) -> usize {
    (size + ARENA_ALIGN - 1) & !(ARENA_ALIGN - 1)
}
