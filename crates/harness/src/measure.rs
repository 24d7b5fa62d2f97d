// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The clock seam: measuring one closure invocation.
//!
//! The launcher only ever talks to the [`CycleCounter`] trait, so the time
//! base can be swapped without touching the cases. The default
//! [`WallClockCounter`] uses the monotonic wall clock and subtracts its
//! own calibrated measurement overhead, mirroring simulator cycle counting
//! with an overhead baseline.

use std::time::Instant;

use tracing::debug;

/// A source of per-invocation cost measurements. Implementations report
/// "cycles" in whatever unit their time base provides; the launcher only
/// compares and averages them.
pub trait CycleCounter {
    /// Runs `f` once and returns its cost with measurement overhead
    /// already subtracted.
    fn measure(&self, f: &mut dyn FnMut()) -> u64;

    /// The calibrated cost of an empty measurement.
    fn overhead(&self) -> u64;
}

/// Wall-clock counter reporting nanoseconds.
#[derive(Debug, Clone)]
pub struct WallClockCounter {
    overhead_ns: u64,
}

const CALIBRATION_ROUNDS: usize = 64;

impl WallClockCounter {
    /// Calibrates the empty-measurement overhead by timing a no-op
    /// repeatedly and keeping the minimum.
    pub fn calibrated() -> Self {
        let mut overhead_ns = u64::MAX;
        for _ in 0..CALIBRATION_ROUNDS {
            let start = Instant::now();
            let elapsed = start.elapsed().as_nanos() as u64;
            overhead_ns = overhead_ns.min(elapsed);
        }
        debug!(overhead_ns, "wall clock counter calibrated");
        Self { overhead_ns }
    }
}

impl Default for WallClockCounter {
    fn default() -> Self {
        Self::calibrated()
    }
}

impl CycleCounter for WallClockCounter {
    fn measure(&self, f: &mut dyn FnMut()) -> u64 {
        let start = Instant::now();
        f();
        let elapsed = start.elapsed().as_nanos() as u64;
        elapsed.saturating_sub(self.overhead_ns)
    }

    fn overhead(&self) -> u64 {
        self.overhead_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_counts_work() {
        let counter = WallClockCounter::calibrated();
        let mut acc = 0u64;
        let cost = counter.measure(&mut || {
            for i in 0..10_000u64 {
                acc = acc.wrapping_add(i);
            }
            std::hint::black_box(acc);
        });
        assert!(cost > 0);
    }

    #[test]
    fn test_empty_measurement_near_zero() {
        let counter = WallClockCounter::calibrated();
        // An empty body costs about the calibrated overhead, so the
        // subtracted result stays tiny.
        let cost = counter.measure(&mut || {});
        assert!(cost < 1_000_000, "empty measurement cost {cost}ns");
    }
}
