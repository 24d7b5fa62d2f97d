// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fragmentation case: one zero-copy transmit pass per iteration.

use frag_engine::{FragEngine, FragError};
use mem_arena::BumpArena;
use ncsi_frame::FrameSource;

use crate::{BenchCase, HarnessConfig, HarnessError};

/// Fragments one NC-SI frame into MCTP transmit batches.
pub struct FragCase {
    engine: Option<FragEngine>,
    frame_size: usize,
    failed: Option<FragError>,
}

impl FragCase {
    pub fn new() -> Self {
        Self {
            engine: None,
            frame_size: 0,
            failed: None,
        }
    }
}

impl Default for FragCase {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchCase for FragCase {
    fn name(&self) -> &'static str {
        "frag"
    }

    fn describe(&self, long: bool) -> &'static str {
        if long {
            "Explodes one NC-SI Ethernet frame into MCTP fragments using the \
             zero-copy path: fragment descriptors receive byte-ranges into \
             the frame, and header/payload segment pairs are batched to the \
             USB transport limits. Only the execute pass is measured; frame \
             staging and descriptor recycling run outside the clock."
        } else {
            "zero-copy frame fragmentation"
        }
    }

    fn init(&mut self, config: &HarnessConfig) -> Result<(), HarnessError> {
        let arena = BumpArena::with_capacity(config.arena_capacity)?;
        let source = FrameSource::new(&arena).map_err(FragError::from)?;
        self.engine = Some(FragEngine::new(config.frag, source));
        self.frame_size = config.frame_size;
        Ok(())
    }

    fn prologue(&mut self) -> Result<(), HarnessError> {
        self.failed = None;
        let Some(engine) = self.engine.as_mut() else {
            return Err(HarnessError::CaseFailed {
                case: "frag",
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
        if let Err(e) = engine.execute(|segments| {
            std::hint::black_box(segments);
        }) {
            self.failed = Some(e);
        }
    }

    fn epilogue(&mut self) -> Result<(), HarnessError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        engine.epilogue()?;
        if let Some(e) = self.failed.take() {
            return Err(HarnessError::Engine(e));
        }
        Ok(())
    }
}
