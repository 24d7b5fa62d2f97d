// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The free/busy list queue.

use crate::QueueError;
use mem_arena::{ArenaBuf, BumpArena};

/// Opaque handle to one queue block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

impl BlockId {
    /// Raw index, for diagnostics only.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Which of the two lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSelector {
    Free,
    Busy,
}

/// Cursor walk direction for [`MsgQueue::next_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Block state tag; must always match the list the block is threaded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Free,
    Busy,
}

/// One pool block: fixed payload region plus intrusive index links.
struct Block {
    buf: ArenaBuf,
    state: BlockState,
    next: Option<usize>,
    prev: Option<usize>,
}

/// Head/tail bookkeeping for one list.
#[derive(Debug, Default, Clone, Copy)]
struct ListHead {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

/// A fixed-block message queue.
///
/// Created once from arena storage; blocks cycle between the free and busy
/// lists for the queue's lifetime and are never returned to the arena.
pub struct MsgQueue {
    blocks: Vec<Block>,
    free: ListHead,
    busy: ListHead,
    block_size: usize,
    /// Cursor state for [`next_item`](Self::next_item), one per list.
    /// Reset whenever the corresponding list is mutated.
    free_cursor: Option<usize>,
    busy_cursor: Option<usize>,
}

impl MsgQueue {
    /// Builds a queue of `block_count` blocks of `block_size` bytes each,
    /// claiming all storage from `arena` up front. Every block starts on
    /// the free list.
    pub fn create(
        block_size: usize,
        block_count: usize,
        arena: &BumpArena,
    ) -> Result<Self, QueueError> {
        if block_size == 0 || block_count == 0 {
            return Err(QueueError::ZeroParameter {
                block_size,
                block_count,
            });
        }

        let mut blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            blocks.push(Block {
                buf: arena.alloc(block_size)?,
                state: BlockState::Free,
                next: None,
                prev: None,
            });
        }

        let mut queue = Self {
            blocks,
            free: ListHead::default(),
            busy: ListHead::default(),
            block_size,
            free_cursor: None,
            busy_cursor: None,
        };

        for idx in 0..block_count {
            queue.push_back(ListSelector::Free, idx);
        }

        tracing::debug!(block_size, block_count, "message queue created");
        Ok(queue)
    }

    /// Pops the free-list head, tags it busy, and appends it to the busy
    /// list. `size_hint` is the caller's intended payload size; it is
    /// validated against the fixed block size but does not shrink the
    /// returned region.
    pub fn request(&mut self, size_hint: usize) -> Result<BlockId, QueueError> {
        if size_hint > self.block_size {
            return Err(QueueError::HintTooLarge {
                hint: size_hint,
                block_size: self.block_size,
            });
        }

        let idx = self.free.head.ok_or(QueueError::Exhausted {
            capacity: self.blocks.len(),
        })?;

        self.unlink(ListSelector::Free, idx);
        self.blocks[idx].state = BlockState::Busy;
        self.push_back(ListSelector::Busy, idx);

        Ok(BlockId(idx))
    }

    /// Returns a busy block to the free list.
    ///
    /// Fails on an unknown id and on double release (block already free).
    pub fn release(&mut self, id: BlockId) -> Result<(), QueueError> {
        let idx = id.0;
        let block = self.blocks.get(idx).ok_or(QueueError::InvalidBlock(idx))?;
        if block.state == BlockState::Free {
            return Err(QueueError::DoubleRelease(idx));
        }

        self.unlink(ListSelector::Busy, idx);
        self.blocks[idx].state = BlockState::Free;
        self.push_back(ListSelector::Free, idx);
        Ok(())
    }

    /// Immutable payload view of a block.
    pub fn payload(&self, id: BlockId) -> Result<&[u8], QueueError> {
        self.blocks
            .get(id.0)
            .map(|b| b.buf.as_slice())
            .ok_or(QueueError::InvalidBlock(id.0))
    }

    /// Mutable payload view of a block.
    pub fn payload_mut(&mut self, id: BlockId) -> Result<&mut [u8], QueueError> {
        self.blocks
            .get_mut(id.0)
            .map(|b| b.buf.as_mut_slice())
            .ok_or(QueueError::InvalidBlock(id.0))
    }

    /// Stateful cursor over one list: each call returns the next block
    /// after the previously returned one, or `None` at the list end.
    ///
    /// The cursor rewinds automatically whenever the list is mutated by
    /// `request`/`release`, so the canonical drain pattern is: walk the
    /// busy list to the end first, then release the visited blocks.
    pub fn next_item(&mut self, selector: ListSelector, direction: Direction) -> Option<BlockId> {
        let (list, cursor) = match selector {
            ListSelector::Free => (&self.free, &mut self.free_cursor),
            ListSelector::Busy => (&self.busy, &mut self.busy_cursor),
        };

        let next = match (*cursor, direction) {
            (None, Direction::Forward) => list.head,
            (None, Direction::Backward) => list.tail,
            (Some(at), Direction::Forward) => self.blocks[at].next,
            (Some(at), Direction::Backward) => self.blocks[at].prev,
        };

        *cursor = next;
        next.map(BlockId)
    }

    /// Resets the walk cursor for one list back to the start.
    pub fn rewind(&mut self, selector: ListSelector) {
        match selector {
            ListSelector::Free => self.free_cursor = None,
            ListSelector::Busy => self.busy_cursor = None,
        }
    }

    /// First block of the busy list, without moving the cursor.
    pub fn busy_head(&self) -> Option<BlockId> {
        self.busy.head.map(BlockId)
    }

    /// Number of blocks currently free.
    pub fn free_len(&self) -> usize {
        self.free.len
    }

    /// Number of blocks currently busy.
    pub fn busy_len(&self) -> usize {
        self.busy.len
    }

    /// Total number of blocks (free + busy, always).
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }

    /// Fixed per-block payload size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    // ── List plumbing ──────────────────────────────────────────

    /// Appends `idx` at the tail of the selected list.
    fn push_back(&mut self, selector: ListSelector, idx: usize) {
        let list = match selector {
            ListSelector::Free => &mut self.free,
            ListSelector::Busy => &mut self.busy,
        };

        let old_tail = list.tail;
        list.tail = Some(idx);
        if list.head.is_none() {
            list.head = Some(idx);
        }
        list.len += 1;

        self.blocks[idx].prev = old_tail;
        self.blocks[idx].next = None;
        if let Some(tail) = old_tail {
            self.blocks[tail].next = Some(idx);
        }

        self.reset_cursor(selector);
    }

    /// Detaches `idx` from the selected list, stitching its neighbours.
    fn unlink(&mut self, selector: ListSelector, idx: usize) {
        let (prev, next) = (self.blocks[idx].prev, self.blocks[idx].next);

        match prev {
            Some(p) => self.blocks[p].next = next,
            None => {
                let list = match selector {
                    ListSelector::Free => &mut self.free,
                    ListSelector::Busy => &mut self.busy,
                };
                list.head = next;
            }
        }

        match next {
            Some(n) => self.blocks[n].prev = prev,
            None => {
                let list = match selector {
                    ListSelector::Free => &mut self.free,
                    ListSelector::Busy => &mut self.busy,
                };
                list.tail = prev;
            }
        }

        let list = match selector {
            ListSelector::Free => &mut self.free,
            ListSelector::Busy => &mut self.busy,
        };
        list.len -= 1;

        self.blocks[idx].prev = None;
        self.blocks[idx].next = None;

        self.reset_cursor(selector);
    }

    fn reset_cursor(&mut self, selector: ListSelector) {
        match selector {
            ListSelector::Free => self.free_cursor = None,
            ListSelector::Busy => self.busy_cursor = None,
        }
    }
}

impl std::fmt::Debug for MsgQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MsgQueue")
            .field("block_size", &self.block_size)
            .field("capacity", &self.blocks.len())
            .field("free", &self.free.len)
            .field("busy", &self.busy.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mem_arena::BumpArena;

    fn queue(block_size: usize, count: usize) -> MsgQueue {
        let arena = BumpArena::with_capacity(64 * 1024).unwrap();
        MsgQueue::create(block_size, count, &arena).unwrap()
    }

    #[test]
    fn test_create_all_free() {
        let q = queue(32, 8);
        assert_eq!(q.free_len(), 8);
        assert_eq!(q.busy_len(), 0);
        assert_eq!(q.capacity(), 8);
        assert_eq!(q.block_size(), 32);
    }

    #[test]
    fn test_zero_parameters() {
        let arena = BumpArena::with_capacity(1024).unwrap();
        assert!(matches!(
            MsgQueue::create(0, 8, &arena),
            Err(QueueError::ZeroParameter { .. })
        ));
        assert!(matches!(
            MsgQueue::create(32, 0, &arena),
            Err(QueueError::ZeroParameter { .. })
        ));
    }

    #[test]
    fn test_storage_failure_propagates() {
        let arena = BumpArena::with_capacity(128).unwrap();
        assert!(matches!(
            MsgQueue::create(64, 100, &arena),
            Err(QueueError::Storage(_))
        ));
    }

    #[test]
    fn test_request_release_roundtrip() {
        let mut q = queue(32, 4);
        let id = q.request(16).unwrap();
        assert_eq!(q.free_len(), 3);
        assert_eq!(q.busy_len(), 1);

        q.payload_mut(id).unwrap().fill(0x5A);
        assert!(q.payload(id).unwrap().iter().all(|&b| b == 0x5A));

        q.release(id).unwrap();
        assert_eq!(q.free_len(), 4);
        assert_eq!(q.busy_len(), 0);
    }

    #[test]
    fn test_conservation_invariant() {
        let mut q = queue(16, 6);
        let mut held = Vec::new();
        for step in 0..20 {
            if step % 3 == 2 {
                if let Some(id) = held.pop() {
                    q.release(id).unwrap();
                }
            } else if let Ok(id) = q.request(8) {
                held.push(id);
            }
            assert_eq!(q.free_len() + q.busy_len(), q.capacity());
        }
    }

    #[test]
    fn test_exhaustion() {
        let mut q = queue(16, 2);
        let _a = q.request(1).unwrap();
        let _b = q.request(1).unwrap();
        assert!(matches!(q.request(1), Err(QueueError::Exhausted { .. })));
    }

    #[test]
    fn test_hint_too_large() {
        let mut q = queue(16, 2);
        assert!(matches!(
            q.request(17),
            Err(QueueError::HintTooLarge { hint: 17, .. })
        ));
        // Nothing was consumed by the failed request.
        assert_eq!(q.free_len(), 2);
    }

    #[test]
    fn test_double_release() {
        let mut q = queue(16, 2);
        let id = q.request(4).unwrap();
        q.release(id).unwrap();
        assert!(matches!(q.release(id), Err(QueueError::DoubleRelease(_))));
    }

    #[test]
    fn test_request_never_returns_busy_block() {
        let mut q = queue(16, 4);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..4 {
            let id = q.request(1).unwrap();
            assert!(seen.insert(id), "block {id:?} handed out twice");
        }
    }

    #[test]
    fn test_fifo_recycling() {
        let mut q = queue(16, 3);
        let a = q.request(1).unwrap();
        let _b = q.request(1).unwrap();
        q.release(a).unwrap();
        // Free list is now [c, a]; the head is the never-used block.
        let c = q.request(1).unwrap();
        assert_ne!(c, a);
        let again = q.request(1).unwrap();
        assert_eq!(again, a);
    }

    #[test]
    fn test_busy_cursor_walks_in_order() {
        let mut q = queue(16, 4);
        let a = q.request(1).unwrap();
        let b = q.request(1).unwrap();
        let c = q.request(1).unwrap();

        let mut walked = Vec::new();
        while let Some(id) = q.next_item(ListSelector::Busy, Direction::Forward) {
            walked.push(id);
        }
        assert_eq!(walked, vec![a, b, c]);

        // Cursor is exhausted; rewinding starts over.
        q.rewind(ListSelector::Busy);
        assert_eq!(q.next_item(ListSelector::Busy, Direction::Forward), Some(a));
    }

    #[test]
    fn test_cursor_backward() {
        let mut q = queue(16, 4);
        let a = q.request(1).unwrap();
        let b = q.request(1).unwrap();

        assert_eq!(
            q.next_item(ListSelector::Busy, Direction::Backward),
            Some(b)
        );
        assert_eq!(
            q.next_item(ListSelector::Busy, Direction::Backward),
            Some(a)
        );
        assert_eq!(q.next_item(ListSelector::Busy, Direction::Backward), None);
    }

    #[test]
    fn test_cursor_resets_on_mutation() {
        let mut q = queue(16, 4);
        let a = q.request(1).unwrap();
        let _b = q.request(1).unwrap();

        assert_eq!(q.next_item(ListSelector::Busy, Direction::Forward), Some(a));
        let _c = q.request(1).unwrap(); // mutates the busy list
        assert_eq!(
            q.next_item(ListSelector::Busy, Direction::Forward),
            Some(a),
            "cursor restarts from the head after a mutation"
        );
    }

    #[test]
    fn test_release_middle_of_busy_list() {
        let mut q = queue(16, 3);
        let a = q.request(1).unwrap();
        let b = q.request(1).unwrap();
        let c = q.request(1).unwrap();

        q.release(b).unwrap();

        let mut walked = Vec::new();
        while let Some(id) = q.next_item(ListSelector::Busy, Direction::Forward) {
            walked.push(id);
        }
        assert_eq!(walked, vec![a, c]);
        assert_eq!(q.free_len(), 1);
    }

    #[test]
    fn test_invalid_block_id() {
        let mut q = queue(16, 2);
        let bogus = BlockId(99);
        assert!(matches!(q.release(bogus), Err(QueueError::InvalidBlock(99))));
        assert!(q.payload(bogus).is_err());
    }

    #[test]
    fn test_debug_format() {
        let q = queue(16, 2);
        let text = format!("{q:?}");
        assert!(text.contains("MsgQueue"));
        assert!(text.contains("free"));
    }
}
