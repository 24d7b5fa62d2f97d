// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The reassembly engine: captures the fragmentation engine's transmit
//! batches into pool blocks, then walks them back into one contiguous
//! buffer, validating sequence numbers and the encapsulation marker.

use mctp_wire::{
    MctpHeader, FIRST_BYTE_MARKER, FIRST_FRAG_PAYLOAD_MAX, FRAG_PAYLOAD_MAX, HEADER_SIZE,
    SEQ_MODULO, USB_MAX_PAYLOAD_SIZE,
};
use mem_arena::{ArenaBuf, BumpArena, ARENA_ALIGN};
use msg_queue::{BlockId, MsgQueue};
use ncsi_frame::{FrameSource, NCSI_PACKET_MAX_SIZE};
use tracing::{debug, trace};

use crate::{DefragFault, FragConfig, FragEngine, FragError, Phase};

/// Receive pool depth. A max-size frame explodes into at most 4 transmit
/// operations, so 8 blocks leave comfortable headroom.
pub const RX_POOL_BLOCKS: usize = 8;

/// MCTP reassembly engine.
///
/// Owns a [`FragEngine`] as its data source. The prologue drives a full
/// fragmentation cycle, capturing every transmit batch into one pool block
/// (one block per USB operation, modelling transport framing). The measured
/// `execute` walks the blocks and reconstructs the original region, minus
/// the one-byte encapsulation marker, into an arena-backed buffer.
///
/// Validation faults are soft: the walk aborts and records the fault, and
/// the epilogue surfaces it after releasing all resources.
pub struct DefragEngine {
    frag: FragEngine,
    pool: MsgQueue,
    reassembly: ArenaBuf,
    /// Captured transmit batches as (block, used bytes), in arrival order.
    blocks: Vec<(BlockId, usize)>,
    /// Start offset into the reassembly buffer, chosen so the shorter
    /// first copy absorbs the misalignment and later copies land 8-aligned.
    start: usize,
    assembled_len: usize,
    expected_len: usize,
    fault: Option<DefragFault>,
    phase: Phase,
}

impl DefragEngine {
    /// Builds the engine and all its storage: a frame source, the receive
    /// pool, and the reassembly buffer, all claimed from `arena` up front.
    pub fn new(config: FragConfig, arena: &BumpArena) -> Result<Self, FragError> {
        let source = FrameSource::new(arena)?;
        let frag = FragEngine::new(config, source);
        let pool = MsgQueue::create(USB_MAX_PAYLOAD_SIZE, RX_POOL_BLOCKS, arena)?;
        let reassembly = arena.alloc(NCSI_PACKET_MAX_SIZE)?;

        Ok(Self {
            frag,
            pool,
            reassembly,
            blocks: Vec::with_capacity(RX_POOL_BLOCKS),
            start: 0,
            assembled_len: 0,
            expected_len: 0,
            fault: None,
            phase: Phase::Idle,
        })
    }

    fn check_phase(&self, operation: &'static str, expected: Phase) -> Result<(), FragError> {
        if self.phase != expected {
            return Err(FragError::Phase {
                operation,
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Stages reassembly input: runs the fragmentation engine's full cycle
    /// with a capture callback that concatenates each batch's segments into
    /// one pool block. `requested_size` of 0 means the configured default.
    pub fn prologue(&mut self, requested_size: usize) -> Result<(), FragError> {
        self.check_phase("prologue", Phase::Idle)?;

        self.frag.prologue(requested_size)?;

        let pool = &mut self.pool;
        let blocks = &mut self.blocks;
        let mut overflow = false;
        self.frag.execute(|segments| {
            let total: usize = segments.iter().map(|s| s.len()).sum();
            let Ok(id) = pool.request(total) else {
                overflow = true;
                return;
            };
            let Ok(dst) = pool.payload_mut(id) else {
                overflow = true;
                return;
            };
            let mut off = 0;
            for seg in segments {
                dst[off..off + seg.len()].copy_from_slice(seg);
                off += seg.len();
            }
            blocks.push((id, total));
        })?;

        if overflow || self.blocks.is_empty() {
            let err = if overflow {
                FragError::CaptureOverflow
            } else {
                FragError::NoCapturedData
            };
            for (id, _) in self.blocks.drain(..) {
                self.pool.release(id)?;
            }
            self.frag.epilogue()?;
            return Err(err);
        }

        let staged = self.frag.staged_size();
        // The marker byte is skipped on copy, so the output is one byte
        // shorter than the fragmented region.
        self.expected_len = staged - 1;
        let first_copy = staged.min(FIRST_FRAG_PAYLOAD_MAX) - 1;
        self.start = (ARENA_ALIGN - first_copy % ARENA_ALIGN) % ARENA_ALIGN;
        self.assembled_len = 0;
        self.fault = None;
        self.phase = Phase::Sized;

        debug!(
            blocks = self.blocks.len(),
            expected = self.expected_len,
            start = self.start,
            "reassembly input staged"
        );
        Ok(())
    }

    /// The measured reassembly walk. Iterates the captured blocks fragment
    /// by fragment: validates the running packet sequence (mod 4 across
    /// block boundaries) and the marker on the very first payload byte,
    /// then copies payloads into the reassembly buffer. Aborts on the
    /// first fault, leaving it for the epilogue to report.
    pub fn execute(&mut self) -> Result<(), FragError> {
        self.check_phase("execute", Phase::Sized)?;

        let reassembly: &mut [u8] = &mut self.reassembly;
        let mut offset = self.start;
        let mut expected_seq: u8 = 0;
        let mut first = true;
        let mut fault = None;

        'walk: for &(id, len) in &self.blocks {
            let data = &self.pool.payload(id)?[..len];
            let mut pos = 0;

            while pos < len {
                if len - pos < HEADER_SIZE + 1 {
                    fault = Some(DefragFault::Truncated { offset: pos });
                    break 'walk;
                }
                let Ok(header) = MctpHeader::decode(&data[pos..]) else {
                    fault = Some(DefragFault::Truncated { offset: pos });
                    break 'walk;
                };

                if header.packet_sequence != expected_seq {
                    fault = Some(DefragFault::SequenceMismatch {
                        expected: expected_seq,
                        found: header.packet_sequence,
                    });
                    break 'walk;
                }

                let payload = &data[pos + HEADER_SIZE..];
                let cap = if first {
                    FIRST_FRAG_PAYLOAD_MAX
                } else {
                    FRAG_PAYLOAD_MAX
                };
                // Payload length is bounded by the bytes left in this
                // buffer. A non-EOM fragment must carry its full payload;
                // anything shorter means the capture was cut off.
                let stream = if header.end_of_message {
                    payload.len()
                } else if payload.len() < cap {
                    fault = Some(DefragFault::Truncated { offset: pos });
                    break 'walk;
                } else {
                    cap
                };

                let (copy_src, advance) = if first {
                    if payload[0] != FIRST_BYTE_MARKER {
                        fault = Some(DefragFault::BadMarker { found: payload[0] });
                        break 'walk;
                    }
                    // Skip the marker byte.
                    (&payload[1..stream], HEADER_SIZE + stream)
                } else {
                    (&payload[..stream], HEADER_SIZE + stream)
                };

                reassembly[offset..offset + copy_src.len()].copy_from_slice(copy_src);
                offset += copy_src.len();
                pos += advance;
                first = false;
                expected_seq = (expected_seq + 1) % SEQ_MODULO;
            }
        }

        self.fault = fault;
        self.assembled_len = offset - self.start;
        self.phase = Phase::Transmitted;
        trace!(assembled = self.assembled_len, fault = ?self.fault, "reassembly walk done");
        Ok(())
    }

    /// Validates the assembled length, releases every captured block, and
    /// recycles the fragmentation engine. Any fault recorded during the
    /// walk, or a length mismatch, is returned after cleanup completes.
    pub fn epilogue(&mut self) -> Result<(), FragError> {
        self.check_phase("epilogue", Phase::Transmitted)?;

        let verdict = match self.fault.take() {
            Some(fault) => Err(FragError::Defrag(fault)),
            None if self.assembled_len != self.expected_len => {
                Err(FragError::Defrag(DefragFault::SizeMismatch {
                    expected: self.expected_len,
                    assembled: self.assembled_len,
                }))
            }
            None => Ok(()),
        };

        for (id, _) in self.blocks.drain(..) {
            self.pool.release(id)?;
        }
        self.assembled_len = 0;
        self.expected_len = 0;
        self.start = 0;
        self.phase = Phase::Idle;
        self.frag.epilogue()?;

        verdict
    }

    /// The reassembled bytes from the last `execute`.
    pub fn assembled(&self) -> &[u8] {
        &self.reassembly[self.start..self.start + self.assembled_len]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Expected reassembled length for the staged input.
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    pub fn pool(&self) -> &MsgQueue {
        &self.pool
    }
}

impl std::fmt::Debug for DefragEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefragEngine")
            .field("phase", &self.phase)
            .field("blocks", &self.blocks.len())
            .field("assembled_len", &self.assembled_len)
            .field("fault", &self.fault)
            .finish()
    }
}
