// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI plumbing.

pub mod describe;
pub mod list;
pub mod run;
pub mod sweep;

use std::path::Path;

use harness::HarnessConfig;

/// Initialises the tracing subscriber from the `-v` count: warnings by
/// default, info at `-v`, debug at `-vv`, trace beyond.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Loads the harness configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<HarnessConfig> {
    match path {
        Some(p) => Ok(HarnessConfig::from_file(p)?),
        None => Ok(HarnessConfig::default()),
    }
}
