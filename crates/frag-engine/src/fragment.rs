// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The fragmentation engine: explodes one NC-SI frame into MCTP fragments
//! and hands header/payload segment pairs to a transmit callback, batched
//! to the USB transport limits. Payload bytes are never copied; every
//! segment is a view into the staged frame.

use std::ops::Range;

use mctp_wire::{
    MctpHeader, FIRST_BYTE_MARKER, FIRST_FRAG_PAYLOAD_MAX, FRAG_PAYLOAD_MAX, HEADER_SIZE,
    MAX_FRAGMENTS, SEQ_MODULO, USB_MAX_PAYLOAD_SIZE, USB_MAX_POINTERS,
};
use ncsi_frame::{FrameSource, NcsiFrame, NCSI_PACKET_MAX_SIZE, PRE_BYTES};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{FragError, Phase};

/// The fragmentation region starts at the last pad byte, which carries the
/// encapsulation marker. The leading pad bytes are never transmitted.
const REGION_START: usize = PRE_BYTES - 1;

/// MCTP identity defaults stamped into every fragment descriptor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FragConfig {
    pub version: u8,
    pub dest_eid: u8,
    pub source_eid: u8,
    /// Frame size used when `prologue` is called with 0.
    pub default_frame_size: usize,
}

impl Default for FragConfig {
    fn default() -> Self {
        Self {
            version: 1,
            dest_eid: 0x10,
            source_eid: 0x20,
            default_frame_size: NCSI_PACKET_MAX_SIZE,
        }
    }
}

/// Counters accumulated over one transmit pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TxStats {
    /// Transmit callback invocations (USB operations).
    pub operations: usize,
    /// Header and payload segments handed out.
    pub segments: usize,
    /// Total bytes across all segments, headers included.
    pub bytes: usize,
    /// Fragments transmitted.
    pub fragments: usize,
}

/// One fragment descriptor: a header in decoded and encoded form plus a
/// byte-range into the fragmentation region.
struct Fragment {
    header: MctpHeader,
    encoded: [u8; HEADER_SIZE],
    range: Range<usize>,
}

impl Fragment {
    /// Descriptor `index` stamped with its idle defaults: sequence
    /// `index mod 4`, SOM on the first descriptor only, EOM clear, empty
    /// range.
    fn stamped(index: usize, config: &FragConfig) -> Self {
        let header = MctpHeader {
            version: config.version,
            dest_eid: config.dest_eid,
            source_eid: config.source_eid,
            message_tag: 0,
            tag_owner: true,
            packet_sequence: (index % SEQ_MODULO as usize) as u8,
            end_of_message: false,
            start_of_message: index == 0,
        };
        Self {
            encoded: header.encode(),
            header,
            range: 0..0,
        }
    }
}

/// Expected fragment count for a region of `size` bytes: the first
/// fragment carries up to 63 bytes, the rest full 64-byte chunks.
fn fragment_count(size: usize) -> usize {
    if size <= FIRST_FRAG_PAYLOAD_MAX {
        1
    } else {
        let remaining = size - FIRST_FRAG_PAYLOAD_MAX;
        1 + remaining.div_ceil(FRAG_PAYLOAD_MAX)
    }
}

/// Zero-copy MCTP fragmentation engine.
///
/// All fragment descriptors are allocated and pre-stamped at construction
/// so the measured `execute` path only adjusts ranges and flags. Drive it
/// through the `prologue` / `execute` / `epilogue` cycle:
///
/// # Example
///
/// ```
/// use frag_engine::{FragConfig, FragEngine};
/// use mem_arena::BumpArena;
/// use ncsi_frame::FrameSource;
///
/// let arena = BumpArena::with_capacity(8192).unwrap();
/// let source = FrameSource::new(&arena).unwrap();
/// let mut engine = FragEngine::new(FragConfig::default(), source);
///
/// engine.prologue(256).unwrap();
/// let stats = engine.execute(|_segments| {}).unwrap();
/// assert_eq!(stats.fragments, engine.expected_fragments());
/// engine.epilogue().unwrap();
/// ```
pub struct FragEngine {
    config: FragConfig,
    source: FrameSource,
    frags: Vec<Fragment>,
    frame: Option<NcsiFrame>,
    /// Bytes of the staged fragmentation region (marker byte included).
    staged_size: usize,
    frag_count: usize,
    stats: TxStats,
    phase: Phase,
}

impl FragEngine {
    /// Builds the engine with all descriptors pre-stamped to defaults.
    pub fn new(config: FragConfig, source: FrameSource) -> Self {
        let frags = (0..MAX_FRAGMENTS)
            .map(|i| Fragment::stamped(i, &config))
            .collect();
        Self {
            config,
            source,
            frags,
            frame: None,
            staged_size: 0,
            frag_count: 0,
            stats: TxStats::default(),
            phase: Phase::Idle,
        }
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

    /// Stages a frame for fragmentation: requests it from the source,
    /// stamps the encapsulation marker into the last pad byte, and sizes
    /// the fragment list. `requested_size` of 0 means the configured
    /// default frame size.
    ///
    /// On error no frame is held and the descriptors are untouched.
    pub fn prologue(&mut self, requested_size: usize) -> Result<(), FragError> {
        self.check_phase("prologue", Phase::Idle)?;

        let size = if requested_size == 0 {
            self.config.default_frame_size
        } else {
            requested_size
        };

        let mut frame = self.source.request_frame(size)?;

        // The fragmentation region opens at the marker so the first
        // payload byte on the wire is always 3, at the cost of the region
        // starting one byte short of alignment.
        frame.pre_bytes_mut()[REGION_START] = FIRST_BYTE_MARKER;

        let staged = frame.len() - REGION_START;
        let count = fragment_count(staged);
        if count > MAX_FRAGMENTS {
            self.source.release_frame(frame);
            return Err(FragError::FrameTooLarge {
                size: staged,
                fragments: count,
            });
        }

        self.frame = Some(frame);
        self.staged_size = staged;
        self.frag_count = count;
        self.phase = Phase::Sized;

        debug!(size, staged, fragments = count, "frame staged");
        Ok(())
    }

    /// Adjusts descriptor ranges to the staged frame and sets EOM on the
    /// fragment consuming the last byte.
    fn adjust_ranges(&mut self) {
        let mut offset = 0;
        let mut remaining = self.staged_size;

        for (i, frag) in self.frags.iter_mut().take(self.frag_count).enumerate() {
            let cap = if i == 0 {
                FIRST_FRAG_PAYLOAD_MAX
            } else {
                FRAG_PAYLOAD_MAX
            };
            let len = remaining.min(cap);
            frag.range = offset..offset + len;
            offset += len;
            remaining -= len;

            frag.header.end_of_message = remaining == 0;
            frag.encoded = frag.header.encode();
        }

        self.phase = Phase::Adjusted;
    }

    /// The measured transmit pass. Walks the fragment list handing
    /// header/payload segment pairs to `tx`, flushing a batch whenever the
    /// next pair would push it past [`USB_MAX_PAYLOAD_SIZE`] bytes or
    /// [`USB_MAX_POINTERS`] segments. A header always ships in the same
    /// batch as its payload.
    pub fn execute<F>(&mut self, mut tx: F) -> Result<TxStats, FragError>
    where
        F: FnMut(&[&[u8]]),
    {
        self.check_phase("execute", Phase::Sized)?;
        self.adjust_ranges();

        let Some(frame) = self.frame.as_ref() else {
            // Sized phase always holds a frame; treat a miss as misuse.
            return Err(FragError::Phase {
                operation: "execute",
                expected: Phase::Sized,
                actual: Phase::Idle,
            });
        };
        let region = &frame.as_slice()[REGION_START..];

        let mut stats = TxStats::default();
        {
            let mut segments: [&[u8]; USB_MAX_POINTERS] = [&[]; USB_MAX_POINTERS];
            let mut seg_count = 0;
            let mut batch_bytes = 0;

            for frag in &self.frags[..self.frag_count] {
                let pair_bytes = HEADER_SIZE + frag.range.len();

                if seg_count > 0
                    && (batch_bytes + pair_bytes > USB_MAX_PAYLOAD_SIZE
                        || seg_count + 2 > USB_MAX_POINTERS)
                {
                    tx(&segments[..seg_count]);
                    stats.operations += 1;
                    seg_count = 0;
                    batch_bytes = 0;
                }

                segments[seg_count] = &frag.encoded;
                segments[seg_count + 1] = &region[frag.range.clone()];
                seg_count += 2;
                batch_bytes += pair_bytes;

                stats.segments += 2;
                stats.bytes += pair_bytes;
                stats.fragments += 1;
            }

            if seg_count > 0 {
                tx(&segments[..seg_count]);
                stats.operations += 1;
            }
        }

        self.stats = stats;
        self.phase = Phase::Transmitted;
        trace!(?stats, "transmit pass complete");
        Ok(stats)
    }

    /// Re-stamps every descriptor to its idle defaults, releases the frame
    /// back to the source, and zeroes the counters.
    pub fn epilogue(&mut self) -> Result<(), FragError> {
        self.check_phase("epilogue", Phase::Transmitted)?;

        for (i, frag) in self.frags.iter_mut().enumerate() {
            *frag = Fragment::stamped(i, &self.config);
        }
        if let Some(frame) = self.frame.take() {
            self.source.release_frame(frame);
        }
        self.staged_size = 0;
        self.frag_count = 0;
        self.stats = TxStats::default();
        self.phase = Phase::Idle;
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Fragment count computed for the staged frame.
    pub fn expected_fragments(&self) -> usize {
        self.frag_count
    }

    /// Bytes in the staged fragmentation region, marker included.
    pub fn staged_size(&self) -> usize {
        self.staged_size
    }

    /// Counters from the last transmit pass.
    pub fn stats(&self) -> TxStats {
        self.stats
    }

    pub fn config(&self) -> &FragConfig {
        &self.config
    }
}

impl std::fmt::Debug for FragEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragEngine")
            .field("phase", &self.phase)
            .field("staged_size", &self.staged_size)
            .field("fragments", &self.frag_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mem_arena::BumpArena;
    use ncsi_frame::NCSI_HEADERS_SIZE;

    fn engine() -> FragEngine {
        let arena = BumpArena::with_capacity(8192).unwrap();
        let source = FrameSource::new(&arena).unwrap();
        FragEngine::new(FragConfig::default(), source)
    }

    /// Frame size that stages a fragmentation region of exactly `region`
    /// bytes. The region is the frame minus the three leading pad bytes.
    fn frame_size_for_region(region: usize) -> usize {
        region + REGION_START
    }

    #[test]
    fn test_fragment_count_boundaries() {
        assert_eq!(fragment_count(1), 1);
        assert_eq!(fragment_count(63), 1);
        assert_eq!(fragment_count(64), 2);
        assert_eq!(fragment_count(63 + 64), 2);
        assert_eq!(fragment_count(63 + 64 + 1), 3);
        assert_eq!(fragment_count(1501), 24);
    }

    #[test]
    fn test_phase_misuse() {
        let mut eng = engine();
        assert!(matches!(
            eng.execute(|_| {}),
            Err(FragError::Phase { .. })
        ));
        assert!(matches!(eng.epilogue(), Err(FragError::Phase { .. })));

        eng.prologue(256).unwrap();
        assert!(matches!(eng.prologue(256), Err(FragError::Phase { .. })));
    }

    #[test]
    fn test_oversize_request_leaves_engine_idle() {
        let mut eng = engine();
        assert!(matches!(
            eng.prologue(NCSI_PACKET_MAX_SIZE + 1),
            Err(FragError::Frame(_))
        ));
        assert_eq!(eng.phase(), Phase::Idle);
        assert_eq!(eng.expected_fragments(), 0);
        // The source got its buffer back.
        eng.prologue(256).unwrap();
    }

    #[test]
    fn test_single_fragment_carries_som_and_eom() {
        let mut eng = engine();
        // Region of 63 bytes: exactly one fragment.
        eng.prologue(frame_size_for_region(63)).unwrap();
        assert_eq!(eng.expected_fragments(), 1);

        let mut headers = Vec::new();
        eng.execute(|segments| {
            headers.push(MctpHeader::decode(segments[0]).unwrap());
        })
        .unwrap();

        assert_eq!(headers.len(), 1);
        assert!(headers[0].start_of_message);
        assert!(headers[0].end_of_message);
        eng.epilogue().unwrap();
    }

    #[test]
    fn test_region_of_64_splits_into_two() {
        let mut eng = engine();
        eng.prologue(frame_size_for_region(64)).unwrap();
        assert_eq!(eng.expected_fragments(), 2);

        let mut sizes = Vec::new();
        eng.execute(|segments| {
            for pair in segments.chunks(2) {
                sizes.push(pair[1].len());
            }
        })
        .unwrap();

        // Second fragment carries the single spill byte.
        assert_eq!(sizes, vec![63, 1]);
        eng.epilogue().unwrap();
    }

    #[test]
    fn test_first_wire_byte_is_marker() {
        let mut eng = engine();
        eng.prologue(512).unwrap();
        let mut first_payload_byte = None;
        eng.execute(|segments| {
            if first_payload_byte.is_none() {
                first_payload_byte = Some(segments[1][0]);
            }
        })
        .unwrap();
        assert_eq!(first_payload_byte, Some(FIRST_BYTE_MARKER));
        eng.epilogue().unwrap();
    }

    #[test]
    fn test_sequence_and_flags_across_fragments() {
        let mut eng = engine();
        eng.prologue(NCSI_PACKET_MAX_SIZE).unwrap();

        let mut headers = Vec::new();
        eng.execute(|segments| {
            for pair in segments.chunks(2) {
                headers.push(MctpHeader::decode(pair[0]).unwrap());
            }
        })
        .unwrap();

        assert_eq!(headers.len(), 24);
        for (i, h) in headers.iter().enumerate() {
            assert_eq!(h.packet_sequence, (i % 4) as u8);
            assert_eq!(h.start_of_message, i == 0);
            assert_eq!(h.end_of_message, i == headers.len() - 1);
            assert_eq!(h.version, 1);
            assert_eq!(h.dest_eid, 0x10);
            assert_eq!(h.source_eid, 0x20);
            assert!(h.tag_owner);
        }
        eng.epilogue().unwrap();
    }

    #[test]
    fn test_batches_respect_usb_limits() {
        let mut eng = engine();
        eng.prologue(NCSI_PACKET_MAX_SIZE).unwrap();

        let mut ok = true;
        let stats = eng
            .execute(|segments| {
                let bytes: usize = segments.iter().map(|s| s.len()).sum();
                ok &= bytes <= USB_MAX_PAYLOAD_SIZE;
                ok &= segments.len() <= USB_MAX_POINTERS;
                // Segments always come in header/payload pairs.
                ok &= segments.len() % 2 == 0;
                ok &= segments.iter().step_by(2).all(|h| h.len() == HEADER_SIZE);
            })
            .unwrap();

        assert!(ok);
        assert_eq!(stats.fragments, 24);
        assert_eq!(stats.segments, 48);
        // 1501 payload bytes plus one header per fragment.
        assert_eq!(stats.bytes, 1501 + 24 * HEADER_SIZE);
        eng.epilogue().unwrap();
    }

    #[test]
    fn test_transmitted_bytes_reconstruct_region() {
        let mut eng = engine();
        eng.prologue(400).unwrap();

        let mut wire = Vec::new();
        eng.execute(|segments| {
            for pair in segments.chunks(2) {
                wire.extend_from_slice(pair[1]);
            }
        })
        .unwrap();

        // Payload bytes concatenate back to the staged region.
        assert_eq!(wire.len(), eng.staged_size());
        assert_eq!(wire[0], FIRST_BYTE_MARKER);
        // Bytes past the headers are the painted pattern.
        let payload_offset = NCSI_HEADERS_SIZE - REGION_START;
        assert_eq!(ncsi_frame::verify(&wire[payload_offset..]), None);
        eng.epilogue().unwrap();
    }

    #[test]
    fn test_epilogue_restores_defaults() {
        let mut eng = engine();
        eng.prologue(512).unwrap();
        eng.execute(|_| {}).unwrap();
        eng.epilogue().unwrap();

        assert_eq!(eng.phase(), Phase::Idle);
        assert_eq!(eng.stats(), TxStats::default());
        for (i, frag) in eng.frags.iter().enumerate() {
            assert_eq!(frag.range, 0..0);
            assert_eq!(frag.header.packet_sequence, (i % 4) as u8);
            assert_eq!(frag.header.start_of_message, i == 0);
            assert!(!frag.header.end_of_message);
        }

        // A second full cycle works on the recycled frame.
        eng.prologue(512).unwrap();
        eng.execute(|_| {}).unwrap();
        eng.epilogue().unwrap();
    }
}
