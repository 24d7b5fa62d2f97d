// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the fixed-block message queue.

use mem_arena::ArenaError;

/// Errors from creating or operating a [`MsgQueue`].
///
/// [`MsgQueue`]: crate::MsgQueue
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// `block_size` or `block_count` was zero at creation.
    #[error("queue parameters must be non-zero (block_size {block_size}, block_count {block_count})")]
    ZeroParameter {
        block_size: usize,
        block_count: usize,
    },

    /// Backing storage could not be claimed from the arena.
    #[error("queue storage allocation failed: {0}")]
    Storage(#[from] ArenaError),

    /// The free list is empty.
    #[error("queue exhausted: all {capacity} blocks are busy")]
    Exhausted { capacity: usize },

    /// The caller's size hint exceeds the fixed block size.
    #[error("size hint {hint} exceeds block size {block_size}")]
    HintTooLarge { hint: usize, block_size: usize },

    /// The block id does not belong to this queue.
    #[error("invalid block id {0}")]
    InvalidBlock(usize),

    /// The block is already on the free list.
    #[error("double release of block {0}")]
    DoubleRelease(usize),
}
