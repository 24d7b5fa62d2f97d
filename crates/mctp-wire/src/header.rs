// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The 4-byte MCTP packet header.
//!
//! Wire layout (must stay bit-exact):
//!
//! ```text
//! byte 0   version
//! byte 1   destination endpoint id
//! byte 2   source endpoint id
//! byte 3   message_tag:3 | tag_owner:1 | packet_sequence:2 | eom:1 | som:1
//!          (bits 0-2)     (bit 3)       (bits 4-5)          (bit 6) (bit 7)
//! ```

use crate::{HEADER_SIZE, SEQ_MODULO};

/// Decode failures for the packed header.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Fewer than [`HEADER_SIZE`] bytes were available.
    #[error("truncated header: need {HEADER_SIZE} bytes, got {0}")]
    Truncated(usize),
}

/// Decoded MCTP packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MctpHeader {
    pub version: u8,
    pub dest_eid: u8,
    pub source_eid: u8,
    /// 3-bit message tag.
    pub message_tag: u8,
    pub tag_owner: bool,
    /// 2-bit packet sequence number, always stored mod [`SEQ_MODULO`].
    pub packet_sequence: u8,
    pub end_of_message: bool,
    pub start_of_message: bool,
}

impl MctpHeader {
    /// Packs the header into its 4-byte wire form. The tag and sequence
    /// fields are masked to their bit widths.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let flags = (self.message_tag & 0x07)
            | (u8::from(self.tag_owner) << 3)
            | ((self.packet_sequence % SEQ_MODULO) << 4)
            | (u8::from(self.end_of_message) << 6)
            | (u8::from(self.start_of_message) << 7);

        [self.version, self.dest_eid, self.source_eid, flags]
    }

    /// Unpacks a header from the first 4 bytes of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < HEADER_SIZE {
            return Err(WireError::Truncated(bytes.len()));
        }

        let flags = bytes[3];
        Ok(Self {
            version: bytes[0],
            dest_eid: bytes[1],
            source_eid: bytes[2],
            message_tag: flags & 0x07,
            tag_owner: flags & 0x08 != 0,
            packet_sequence: (flags >> 4) & 0x03,
            end_of_message: flags & 0x40 != 0,
            start_of_message: flags & 0x80 != 0,
        })
    }
}
