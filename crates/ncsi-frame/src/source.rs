// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The frame source: builds and recycles a single NC-SI Ethernet frame.

use mem_arena::{ArenaBuf, BumpArena};
use tracing::trace;

use crate::{
    FrameError, ETHERTYPE_NCSI, NCSI_HEADERS_SIZE, NCSI_PACKET_MAX_SIZE, PRE_BYTES,
};

/// Fixed example MAC addresses stamped into every frame.
const DEST_MAC: [u8; 6] = [0x00, 0x25, 0x90, 0xAB, 0xCD, 0xEF];
const SRC_MAC: [u8; 6] = [0x00, 0x14, 0x22, 0x01, 0x23, 0x45];

/// Management controller id carried in the NC-SI control header.
const MC_ID: u8 = 0xA5;
/// Select Package command code.
const COMMAND: u8 = 0x01;
const CHANNEL_ID: u8 = 0x02;

// ── Payload painting ──────────────────────────────────────────────────────

/// Deterministic pattern byte for payload position `i`.
#[inline]
fn pattern_byte(i: usize) -> u8 {
    (i as u8).wrapping_mul(7).wrapping_add(0x5A)
}

/// Fills `buf` with the deterministic verification pattern.
pub fn paint(buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = pattern_byte(i);
    }
}

/// Checks that `buf` still carries the pattern written by [`paint`].
/// Returns the index of the first mismatching byte, if any.
pub fn verify(buf: &[u8]) -> Option<usize> {
    buf.iter()
        .enumerate()
        .find(|&(i, &byte)| byte != pattern_byte(i))
        .map(|(i, _)| i)
}

// ── Frame ─────────────────────────────────────────────────────────────────

/// A populated NC-SI Ethernet frame handed out by [`FrameSource`].
///
/// Owns its arena storage while outstanding; give it back with
/// [`FrameSource::release_frame`] so the next request can reuse the buffer.
pub struct NcsiFrame {
    buf: ArenaBuf,
    len: usize,
}

impl NcsiFrame {
    /// Total frame size in bytes, headers included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The full frame bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Mutable view of the full frame bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    /// The reserved pre-bytes ahead of the Ethernet header.
    pub fn pre_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..PRE_BYTES]
    }

    /// The painted payload after the headers.
    pub fn payload(&self) -> &[u8] {
        &self.buf[NCSI_HEADERS_SIZE..self.len]
    }

    /// Payload length declared in the NC-SI control header (big-endian).
    pub fn declared_payload_length(&self) -> u16 {
        u16::from_be_bytes([self.buf[22], self.buf[23]])
    }

    /// EtherType from the Ethernet header (big-endian).
    pub fn ethertype(&self) -> u16 {
        u16::from_be_bytes([self.buf[16], self.buf[17]])
    }
}

impl std::fmt::Debug for NcsiFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NcsiFrame")
            .field("len", &self.len)
            .field("ethertype", &format_args!("{:#06x}", self.ethertype()))
            .field("payload_len", &self.declared_payload_length())
            .finish()
    }
}

// ── Frame source ──────────────────────────────────────────────────────────

/// Builds NC-SI frames on demand from a single arena-backed buffer.
///
/// The storage is allocated once at construction and recycled across
/// request/release cycles; only one frame may be outstanding at a time.
///
/// # Example
///
/// ```
/// use mem_arena::BumpArena;
/// use ncsi_frame::FrameSource;
///
/// let arena = BumpArena::with_capacity(4096).unwrap();
/// let mut source = FrameSource::new(&arena).unwrap();
///
/// let frame = source.request_frame(512).unwrap();
/// assert_eq!(frame.len(), 512);
/// source.release_frame(frame);
/// ```
pub struct FrameSource {
    /// `None` while a frame is outstanding.
    spare: Option<ArenaBuf>,
}

impl FrameSource {
    /// Creates a source backed by one max-size frame buffer from `arena`.
    pub fn new(arena: &BumpArena) -> Result<Self, FrameError> {
        let spare = arena.alloc(NCSI_PACKET_MAX_SIZE)?;
        Ok(Self { spare: Some(spare) })
    }

    /// Populates and returns a frame of exactly `requested_size` bytes.
    ///
    /// The Ethernet and NC-SI headers are stamped with fixed example values
    /// and the payload is painted with the verification pattern. Errors if
    /// `requested_size` leaves no payload room, exceeds the MTU, or a frame
    /// is still outstanding.
    pub fn request_frame(&mut self, requested_size: usize) -> Result<NcsiFrame, FrameError> {
        if requested_size <= NCSI_HEADERS_SIZE || requested_size > NCSI_PACKET_MAX_SIZE {
            return Err(FrameError::SizeOutOfRange {
                requested: requested_size,
            });
        }

        let mut buf = self.spare.take().ok_or(FrameError::SourceBusy)?;
        let payload_size = requested_size - NCSI_HEADERS_SIZE;

        {
            let bytes = &mut buf[..requested_size];
            bytes[..PRE_BYTES].fill(0);

            bytes[4..10].copy_from_slice(&DEST_MAC);
            bytes[10..16].copy_from_slice(&SRC_MAC);
            bytes[16..18].copy_from_slice(&ETHERTYPE_NCSI.to_be_bytes());

            bytes[18] = MC_ID;
            bytes[19] = COMMAND;
            bytes[20] = CHANNEL_ID;
            bytes[21] = 0x03;
            bytes[22..24].copy_from_slice(&(payload_size as u16).to_be_bytes());
            bytes[24] = 0x5A;
            bytes[25] = 0x00;

            paint(&mut bytes[NCSI_HEADERS_SIZE..requested_size]);
        }

        trace!(size = requested_size, payload = payload_size, "frame built");
        Ok(NcsiFrame {
            buf,
            len: requested_size,
        })
    }

    /// Takes a frame back, scrubbing its header region for the next request.
    pub fn release_frame(&mut self, mut frame: NcsiFrame) {
        frame.buf[..NCSI_HEADERS_SIZE].fill(0);
        self.spare = Some(frame.buf);
    }

    /// True when no frame is outstanding.
    pub fn is_idle(&self) -> bool {
        self.spare.is_some()
    }
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("idle", &self.is_idle())
            .finish()
    }
}
