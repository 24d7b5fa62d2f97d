// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reassembly case: one validated reassembly walk per iteration.

use frag_engine::{DefragEngine, FragError};
use mem_arena::BumpArena;

use crate::{BenchCase, HarnessConfig, HarnessError};

/// Reassembles captured MCTP transmit batches back into one frame.
pub struct DefragCase {
    engine: Option<DefragEngine>,
    frame_size: usize,
    failed: Option<FragError>,
}

impl DefragCase {
    pub fn new() -> Self {
        Self {
            engine: None,
            frame_size: 0,
            failed: None,
        }
    }
}

impl Default for DefragCase {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchCase for DefragCase {
    fn name(&self) -> &'static str {
        "defrag"
    }

    fn describe(&self, long: bool) -> &'static str {
        if long {
            "Rebuilds the original NC-SI frame from captured MCTP transmit \
             batches. The prologue runs a full fragmentation cycle into \
             fixed-size pool blocks; the measured walk validates packet \
             sequence numbers and the encapsulation marker while copying \
             payloads into one contiguous buffer, with the start offset \
             chosen so the copies land 8-aligned."
        } else {
            "validated fragment reassembly"
        }
    }

    fn init(&mut self, config: &HarnessConfig) -> Result<(), HarnessError> {
        let arena = BumpArena::with_capacity(config.arena_capacity)?;
        self.engine = Some(DefragEngine::new(config.frag, &arena)?);
        self.frame_size = config.frame_size;
        Ok(())
    }

    fn prologue(&mut self) -> Result<(), HarnessError> {
        self.failed = None;
        let Some(engine) = self.engine.as_mut() else {
            return Err(HarnessError::CaseFailed {
                case: "defrag",
                stage: "prologue",
                reason: "case not initialised".into(),
            });
        };
        engine.prologue(self.frame_size)?;
        Ok(())
    }

    fn execute(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if let Err(e) = engine.execute() {
            self.failed = Some(e);
        }
    }

    fn epilogue(&mut self) -> Result<(), HarnessError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        // The engine's epilogue surfaces any fault recorded by the walk.
        engine.epilogue()?;
        if let Some(e) = self.failed.take() {
            return Err(HarnessError::Engine(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let config = HarnessConfig::default();
        let mut case = DefragCase::new();
        case.init(&config).unwrap();

        for _ in 0..3 {
            case.prologue().unwrap();
            case.execute();
            case.epilogue().unwrap();
        }
    }
}
