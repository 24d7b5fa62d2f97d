// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cumulative allocation statistics for the bump arena.

/// Metrics about arena usage, useful for sizing the static pool.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ArenaStats {
    /// Number of successful allocations.
    pub allocations: u64,
    /// Number of allocation requests refused (zero-size or exhaustion).
    pub failed_allocations: u64,
    /// Break offset high-water mark in bytes. Since the arena never frees,
    /// this always equals the current break offset.
    pub high_water_bytes: usize,
    /// Total bytes handed out, after alignment.
    pub allocated_bytes: u64,
}

impl ArenaStats {
    pub(crate) fn record_alloc(&mut self, aligned_size: usize, brk: usize) {
        self.allocations += 1;
        self.allocated_bytes += aligned_size as u64;
        self.high_water_bytes = brk;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_allocations += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Arena: {} allocations ({} bytes), {} refused, high water {} bytes",
            self.allocations, self.allocated_bytes, self.failed_allocations, self.high_water_bytes,
        )
    }
}
