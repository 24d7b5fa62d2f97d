// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mctp-bench sweep` command: run cases across frame sizes and print a
//! comparison table.

use harness::{HarnessConfig, Launcher};

pub fn execute(
    config: HarnessConfig,
    sizes_str: &str,
    cases_str: &str,
    repetitions: Option<u32>,
) -> anyhow::Result<()> {
    let sizes: Vec<usize> = sizes_str
        .split(',')
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid frame size '{}': {e}", s.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let cases: Vec<&str> = cases_str.split(',').map(|s| s.trim()).collect();

    println!("Frame-size sweep:");
    println!();
    println!(
        "  {:<10} {:>10} {:>12} {:>12} {:>12} {:>8}",
        "Case", "Frame", "Avg cycles", "Min", "Max", "Failed"
    );
    println!("  {}", "-".repeat(68));

    for &size in &sizes {
        let mut sized = config.clone();
        sized.frame_size = size;
        if let Err(e) = sized.validate() {
            println!("  {:<10} {:>10}     SKIPPED: {e}", "-", size);
            continue;
        }

        let mut launcher = Launcher::with_default_cases(sized)?;
        for &case in &cases {
            match launcher.run(case, repetitions) {
                Ok(report) => println!(
                    "  {:<10} {:>10} {:>12} {:>12} {:>12} {:>8}",
                    case,
                    size,
                    report.avg_cycles,
                    report.min_cycles,
                    report.max_cycles,
                    report.failed
                ),
                Err(e) => println!("  {case:<10} {size:>10}     FAILED: {e}"),
            }
        }
    }

    println!();
    Ok(())
}
