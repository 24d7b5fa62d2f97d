// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Harness error type, folding in the errors of every layer below.

use thiserror::Error;

/// Errors surfaced by the launcher and the benchmark cases.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be read, parsed, or validated.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// No registered case matches the requested name.
    #[error("unknown benchmark case '{0}'")]
    UnknownCase(String),

    /// Arena allocation failed while building a case.
    #[error("arena: {0}")]
    Arena(#[from] mem_arena::ArenaError),

    /// Message queue operation failed.
    #[error("queue: {0}")]
    Queue(#[from] msg_queue::QueueError),

    /// Fragmentation or reassembly engine failed.
    #[error("engine: {0}")]
    Engine(#[from] frag_engine::FragError),

    /// A case lifecycle step failed.
    #[error("case '{case}' {stage} failed: {reason}")]
    CaseFailed {
        case: &'static str,
        stage: &'static str,
        reason: String,
    },
}
