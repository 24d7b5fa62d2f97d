// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mctp-bench run` command: run one case and print its cycle report.

use harness::{HarnessConfig, Launcher};

pub fn execute(
    mut config: HarnessConfig,
    case: &str,
    repetitions: Option<u32>,
    frame_size: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(size) = frame_size {
        config.frame_size = size;
    }
    config.validate()?;

    let mut launcher = Launcher::with_default_cases(config)?;
    let report = launcher.run(case, repetitions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }

    Ok(())
}
