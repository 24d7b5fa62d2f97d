// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types shared by the fragmentation and reassembly engines.

use thiserror::Error;

use crate::Phase;

/// Hard errors from either engine. Reassembly validation failures travel
/// as [`DefragFault`] wrapped in [`FragError::Defrag`].
#[derive(Debug, Error)]
pub enum FragError {
    /// An operation was called outside its legal phase.
    #[error("{operation} called in phase {actual:?}, expected {expected:?}")]
    Phase {
        operation: &'static str,
        expected: Phase,
        actual: Phase,
    },

    /// The staged frame would explode into more fragments than allowed.
    #[error("frame of {size} bytes needs {fragments} fragments, over the limit")]
    FrameTooLarge { size: usize, fragments: usize },

    /// The frame source refused the request.
    #[error("frame source: {0}")]
    Frame(#[from] ncsi_frame::FrameError),

    /// The receive pool refused a block operation.
    #[error("receive pool: {0}")]
    Pool(#[from] msg_queue::QueueError),

    /// Backing storage could not be allocated.
    #[error("storage: {0}")]
    Storage(#[from] mem_arena::ArenaError),

    /// The capture callback ran out of pool blocks mid-transmit.
    #[error("receive pool exhausted while capturing transmit batches")]
    CaptureOverflow,

    /// The fragmentation pass produced no transmit batches to reassemble.
    #[error("no transmit batches captured")]
    NoCapturedData,

    /// A reassembly validation fault recorded during the measured walk.
    #[error("reassembly fault: {0}")]
    Defrag(#[from] DefragFault),
}

/// Soft validation faults detected while reassembling. The walk aborts on
/// the first fault; the epilogue surfaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DefragFault {
    /// A fragment header carried the wrong packet sequence number.
    #[error("packet sequence mismatch: expected {expected}, found {found}")]
    SequenceMismatch { expected: u8, found: u8 },

    /// The first payload byte of the first fragment was not the marker.
    #[error("bad encapsulation marker: expected 3, found {found}")]
    BadMarker { found: u8 },

    /// A fragment header did not fit in the remaining buffer bytes.
    #[error("truncated fragment at buffer offset {offset}")]
    Truncated { offset: usize },

    /// The assembled length disagrees with the fragmented input length.
    #[error("assembled {assembled} bytes, expected {expected}")]
    SizeMismatch { expected: usize, assembled: usize },
}
