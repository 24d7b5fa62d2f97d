// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # harness
//!
//! Cycle measurement harness for the MCTP-over-USB stack. A [`Launcher`]
//! holds a set of [`BenchCase`] implementations and drives each through
//! the `init` / `prologue` / `execute` / `epilogue` lifecycle, timing only
//! the `execute` step through the [`CycleCounter`] seam and reporting
//! averaged results as a [`CycleReport`].
//!
//! The bundled cases cover the stack bottom-up: a 32-byte `memcpy`
//! baseline, message queue request/release, frame fragmentation, and
//! fragment reassembly.

pub mod cases;
mod config;
mod error;
mod launcher;
mod measure;
mod metrics;

pub use config::HarnessConfig;
pub use error::HarnessError;
pub use launcher::{BenchCase, Launcher};
pub use measure::{CycleCounter, WallClockCounter};
pub use metrics::{CycleMetrics, CycleReport};
