// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Baseline case: one 32-byte copy. Everything else is compared against
//! this floor.

use crate::{BenchCase, HarnessConfig, HarnessError};

const COPY_SIZE: usize = 32;

/// Copies a fixed 32-byte buffer once per measured iteration.
pub struct MemcpyCase {
    src: [u8; COPY_SIZE],
    dst: [u8; COPY_SIZE],
}

impl MemcpyCase {
    pub fn new() -> Self {
        let mut src = [0u8; COPY_SIZE];
        for (i, b) in src.iter_mut().enumerate() {
            *b = 0x41 + i as u8;
        }
        Self {
            src,
            dst: [0u8; COPY_SIZE],
        }
    }
}

impl Default for MemcpyCase {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchCase for MemcpyCase {
    fn name(&self) -> &'static str {
        "memcpy"
    }

    fn describe(&self, long: bool) -> &'static str {
        if long {
            "Copies a fixed 32-byte buffer once per iteration. This is the \
             measurement floor: every other case's cost is read relative to \
             what a single small copy costs on this machine."
        } else {
            "32-byte copy baseline"
        }
    }

    fn init(&mut self, _config: &HarnessConfig) -> Result<(), HarnessError> {
        Ok(())
    }

    fn prologue(&mut self) -> Result<(), HarnessError> {
        Ok(())
    }

    fn execute(&mut self) {
        self.dst.copy_from_slice(&self.src);
        std::hint::black_box(&self.dst);
    }

    fn epilogue(&mut self) -> Result<(), HarnessError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_happens() {
        let mut case = MemcpyCase::new();
        case.execute();
        assert_eq!(case.dst, case.src);
        assert_eq!(case.dst[0], 0x41);
    }
}
