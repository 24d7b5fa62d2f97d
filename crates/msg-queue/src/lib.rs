// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # msg-queue
//!
//! A fixed-block message queue built on two doubly linked lists: one of
//! free blocks, one of busy blocks. All block storage is claimed from a
//! [`BumpArena`] once, at creation; after that the queue performs no
//! allocation at all: `request` and `release` are O(1) list moves. This
//! is the property that makes the queue deterministic enough to
//! cycle-count on an embedded core.
//!
//! The lists are index-linked rather than pointer-threaded: each block
//! carries `next`/`prev` indices plus a state tag, and a block is on
//! exactly one list at any time with its tag matching.
//!
//! # Example
//! ```
//! use mem_arena::BumpArena;
//! use msg_queue::{MsgQueue, ListSelector};
//!
//! let arena = BumpArena::with_capacity(4096).unwrap();
//! let mut queue = MsgQueue::create(64, 8, &arena).unwrap();
//!
//! let id = queue.request(16).unwrap();
//! queue.payload_mut(id).unwrap()[0] = 0xAB;
//! assert_eq!(queue.busy_len(), 1);
//!
//! queue.release(id).unwrap();
//! assert_eq!(queue.free_len(), 8);
//! ```

mod error;
mod queue;

pub use error::QueueError;
pub use queue::{BlockId, Direction, ListSelector, MsgQueue};
