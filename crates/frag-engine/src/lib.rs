// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # frag-engine
//!
//! Zero-copy MCTP fragmentation and its inverse, reassembly, over a
//! simulated USB transport.
//!
//! [`FragEngine`] explodes an NC-SI frame into up to
//! [`mctp_wire::MAX_FRAGMENTS`] MCTP fragments without copying payload
//! bytes: each fragment descriptor carries a pre-encoded 4-byte header and a
//! byte-range into the source frame. Header/payload segment pairs are packed
//! into USB transmit batches bounded by [`mctp_wire::USB_MAX_PAYLOAD_SIZE`]
//! bytes and [`mctp_wire::USB_MAX_POINTERS`] segments.
//!
//! [`DefragEngine`] runs the opposite direction: it captures the transmit
//! batches into fixed-size pool blocks, then walks them fragment by
//! fragment, validating the packet sequence and the encapsulation marker
//! while copying payloads back into a single contiguous buffer.
//!
//! Both engines run the same measured cycle:
//!
//! ```text
//! prologue  ->  execute  ->  epilogue
//! (setup)       (measured)   (validate + recycle)
//! ```

mod defrag;
mod error;
mod fragment;

pub use defrag::{DefragEngine, RX_POOL_BLOCKS};
pub use error::{DefragFault, FragError};
pub use fragment::{FragConfig, FragEngine, TxStats};

/// Runtime phase of an engine cycle. Operations check the phase and refuse
/// out-of-order calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No frame staged; `prologue` is the only legal call.
    Idle,
    /// A frame is staged and sized; waiting for `execute`.
    Sized,
    /// Fragment ranges are adjusted to the staged frame (transient within
    /// `execute`).
    Adjusted,
    /// Transmit completed; waiting for `epilogue`.
    Transmitted,
}
