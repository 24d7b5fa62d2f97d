// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mctp-bench list` command: show the registered benchmark cases.

use harness::{HarnessConfig, Launcher};

pub fn execute(config: HarnessConfig) -> anyhow::Result<()> {
    let launcher = Launcher::with_default_cases(config)?;

    println!("Available benchmark cases:");
    println!();
    for (name, short) in launcher.cases() {
        println!("  {name:<10} {short}");
    }
    println!();
    println!("Use `mctp-bench describe <case>` for details.");

    Ok(())
}
