// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Message queue case: one request/release round trip per iteration.

use mem_arena::BumpArena;
use msg_queue::MsgQueue;

use crate::{BenchCase, HarnessConfig, HarnessError};

/// Pops a block from the pool and pushes it straight back.
pub struct MsgqCase {
    queue: Option<MsgQueue>,
    failed: bool,
}

impl MsgqCase {
    pub fn new() -> Self {
        Self {
            queue: None,
            failed: false,
        }
    }
}

impl Default for MsgqCase {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchCase for MsgqCase {
    fn name(&self) -> &'static str {
        "msgq"
    }

    fn describe(&self, long: bool) -> &'static str {
        if long {
            "Requests one block from the fixed-block pool and releases it \
             again. Both operations are O(1) list-head moves; the measured \
             cost is the per-message bookkeeping floor of the transport."
        } else {
            "pool request/release round trip"
        }
    }

    fn init(&mut self, config: &HarnessConfig) -> Result<(), HarnessError> {
        let arena = BumpArena::with_capacity(config.arena_capacity)?;
        let queue = MsgQueue::create(config.pool_block_size, config.pool_block_count, &arena)?;
        self.queue = Some(queue);
        Ok(())
    }

    fn prologue(&mut self) -> Result<(), HarnessError> {
        self.failed = false;
        if self.queue.is_none() {
            return Err(HarnessError::CaseFailed {
                case: "msgq",
                stage: "prologue",
                reason: "case not initialised".into(),
            });
        }
        Ok(())
    }

    fn execute(&mut self) {
        let Some(queue) = self.queue.as_mut() else {
            self.failed = true;
            return;
        };
        match queue.request(16) {
            Ok(id) => {
                if queue.release(id).is_err() {
                    self.failed = true;
                }
            }
            Err(_) => self.failed = true,
        }
    }

    fn epilogue(&mut self) -> Result<(), HarnessError> {
        if self.failed {
            return Err(HarnessError::CaseFailed {
                case: "msgq",
                stage: "epilogue",
                reason: "request/release round trip failed".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_conserves_pool() {
        let config = HarnessConfig::default();
        let mut case = MsgqCase::new();
        case.init(&config).unwrap();

        for _ in 0..8 {
            case.prologue().unwrap();
            case.execute();
            case.epilogue().unwrap();
        }

        let queue = case.queue.as_ref().unwrap();
        assert_eq!(queue.free_len(), config.pool_block_count);
        assert_eq!(queue.busy_len(), 0);
    }

    #[test]
    fn test_prologue_requires_init() {
        let mut case = MsgqCase::new();
        assert!(case.prologue().is_err());
    }
}
