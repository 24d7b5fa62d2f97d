// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mctp-bench describe` command: print a case's full description.

use harness::{HarnessConfig, Launcher};

pub fn execute(config: HarnessConfig, case: &str) -> anyhow::Result<()> {
    let launcher = Launcher::with_default_cases(config)?;
    let description = launcher.describe(case)?;

    println!("{case}:");
    println!();
    println!("  {description}");

    Ok(())
}
