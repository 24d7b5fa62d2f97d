// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error type for the frame source.

use thiserror::Error;

use crate::{NCSI_HEADERS_SIZE, NCSI_PACKET_MAX_SIZE};

/// Errors produced while requesting or releasing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Requested frame size leaves no payload room or exceeds the MTU.
    #[error(
        "frame size {requested} out of range \
         (must be > {NCSI_HEADERS_SIZE} and <= {NCSI_PACKET_MAX_SIZE})"
    )]
    SizeOutOfRange { requested: usize },

    /// A frame is already outstanding; the source holds a single buffer.
    #[error("frame source busy: a frame is already outstanding")]
    SourceBusy,

    /// The backing arena could not supply the frame storage.
    #[error("frame storage: {0}")]
    Storage(#[from] mem_arena::ArenaError),
}
