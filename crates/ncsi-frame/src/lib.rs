// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # ncsi-frame
//!
//! Synthetic NC-SI Ethernet frame source. Produces realistic-looking frames
//! for the fragmentation benchmarks: a handful of reserved leading bytes,
//! a 14-byte Ethernet header carrying the NC-SI EtherType, the 8-byte NC-SI
//! control header, and a payload painted with a deterministic pattern that
//! can be byte-verified after a fragment/reassemble round trip.
//!
//! Frame layout (`NCSI_HEADERS_SIZE` = 26 bytes of headers):
//!
//! ```text
//! offset  0 ..  4   reserved pre-bytes (byte 3 later carries the
//!                   encapsulation marker)
//! offset  4 .. 18   Ethernet header: dest MAC, src MAC, ethertype 0x88F8
//! offset 18 .. 26   NC-SI control header: mc_id, command, channel,
//!                   reserved, payload_length (BE), reserved2
//! offset 26 .. N    painted payload
//! ```
//!
//! A [`FrameSource`] owns a single arena-backed frame buffer and hands it
//! out through the request/release pairing the transmit path expects. Only
//! one frame can be outstanding at a time.

mod error;
mod source;

pub use error::FrameError;
pub use source::{paint, verify, FrameSource, NcsiFrame};

/// Reserved bytes prepended ahead of the Ethernet header.
pub const PRE_BYTES: usize = 4;

/// Ethernet header size: two MACs plus the EtherType.
pub const ETH_HEADER_SIZE: usize = 14;

/// NC-SI control header size.
pub const NCSI_CTRL_SIZE: usize = 8;

/// Total header bytes ahead of the payload.
pub const NCSI_HEADERS_SIZE: usize = PRE_BYTES + ETH_HEADER_SIZE + NCSI_CTRL_SIZE;

/// Largest frame the source will produce (standard MTU plus the pre-bytes).
pub const NCSI_PACKET_MAX_SIZE: usize = 1500 + PRE_BYTES;

/// EtherType assigned to NC-SI traffic.
pub const ETHERTYPE_NCSI: u16 = 0x88F8;
