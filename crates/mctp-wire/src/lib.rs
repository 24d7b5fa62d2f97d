// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # mctp-wire
//!
//! Wire-level definitions for carrying MCTP packets over the simulated USB
//! transport: the 4-byte packet header codec and the transport sizing
//! constants shared by the fragmentation and reassembly engines.

mod header;

pub use header::{MctpHeader, WireError};

/// Size of the encoded MCTP header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Maximum payload bytes carried by one fragment (USB base packet size).
pub const FRAG_PAYLOAD_MAX: usize = 64;

/// Maximum payload bytes of the *first* fragment. One byte less than the
/// standard size: the leading byte of the first payload is the reserved
/// encapsulation marker.
pub const FIRST_FRAG_PAYLOAD_MAX: usize = FRAG_PAYLOAD_MAX - 1;

/// Maximum number of fragments a single frame may explode into. Frames
/// needing more are dropped, not truncated.
pub const MAX_FRAGMENTS: usize = 25;

/// Upper bound on the bytes batched into one USB transmit operation.
pub const USB_MAX_PAYLOAD_SIZE: usize = 512;

/// Upper bound on the pointer/length segments in one USB transmit operation.
pub const USB_MAX_POINTERS: usize = 16;

/// Value the first payload byte of the first fragment must carry.
pub const FIRST_BYTE_MARKER: u8 = 3;

/// The packet sequence number wraps at this modulus (2-bit field).
pub const SEQ_MODULO: u8 = 4;
