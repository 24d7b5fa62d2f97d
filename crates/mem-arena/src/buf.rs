// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Owned view of a single arena allocation.
//!
//! [`ArenaBuf`] is the handle the arena returns for every allocation. It
//! behaves like an owned `[u8]` buffer, but the bytes live inside the
//! arena's backing storage; the buf pins that storage through an `Arc`.
//! Dropping a buf returns nothing to the arena: by design there is no
//! free path.

use crate::arena::ArenaInner;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// An exclusively owned byte region inside a [`BumpArena`].
///
/// Each `ArenaBuf` covers a range no other buf overlaps, so it can hand out
/// `&mut [u8]` without synchronisation.
///
/// [`BumpArena`]: crate::BumpArena
pub struct ArenaBuf {
    arena: Arc<ArenaInner>,
    offset: usize,
    len: usize,
}

impl ArenaBuf {
    pub(crate) fn new(arena: Arc<ArenaInner>, offset: usize, len: usize) -> Self {
        Self { arena, offset, len }
    }

    /// Length of this region in bytes (the requested, unaligned size).
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the region is empty. The arena refuses zero-sized
    /// allocations, so this is only reachable through slicing APIs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset of this region from the arena base.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Immutable view of the region.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the region [offset, offset+len) was claimed exactly once
        // by the arena's break offset and is never handed out again; `self`
        // has exclusive ownership of it and the storage is pinned by `arena`.
        unsafe { std::slice::from_raw_parts(self.arena.base_ptr().add(self.offset), self.len) }
    }

    /// Mutable view of the region.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: same disjointness argument as `as_slice`; `&mut self`
        // guarantees no other view of this region exists.
        unsafe {
            std::slice::from_raw_parts_mut(self.arena.base_ptr().add(self.offset), self.len)
        }
    }
}

impl Deref for ArenaBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl DerefMut for ArenaBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

// ArenaBuf is Send: the region is exclusively owned and the storage is
// kept alive by the Arc. It is not Sync: `&mut` access is unsynchronised.
unsafe impl Send for ArenaBuf {}

impl std::fmt::Debug for ArenaBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaBuf")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::BumpArena;

    #[test]
    fn test_write_read() {
        let arena = BumpArena::with_capacity(128).unwrap();
        let mut buf = arena.alloc(16).unwrap();
        buf[0] = 42;
        buf[15] = 7;
        assert_eq!(buf[0], 42);
        assert_eq!(buf[15], 7);
        assert_eq!(buf.len(), 16);
    }

    #[test]
    fn test_slice_ops_via_deref() {
        let arena = BumpArena::with_capacity(128).unwrap();
        let mut buf = arena.alloc(8).unwrap();
        buf.copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&buf[2..5], &[3, 4, 5]);
    }

    #[test]
    fn test_buf_outlives_arena_handle() {
        let buf = {
            let arena = BumpArena::with_capacity(128).unwrap();
            let mut b = arena.alloc(4).unwrap();
            b.copy_from_slice(&[9, 9, 9, 9]);
            b
            // `arena` handle dropped here; storage stays alive via Arc.
        };
        assert_eq!(&buf[..], &[9, 9, 9, 9]);
    }

    #[test]
    fn test_debug_format() {
        let arena = BumpArena::with_capacity(128).unwrap();
        let buf = arena.alloc(4).unwrap();
        let text = format!("{buf:?}");
        assert!(text.contains("ArenaBuf"));
    }
}
