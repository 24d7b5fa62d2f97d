// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # mctp-bench
//!
//! Command-line interface for the MCTP-over-USB cycle benchmarks.
//!
//! ## Usage
//! ```bash
//! # List the available benchmark cases
//! mctp-bench list
//!
//! # Run one case
//! mctp-bench run frag --repetitions 200 --frame-size 1504
//!
//! # Sweep the fragmentation cases across frame sizes
//! mctp-bench sweep --sizes 64,256,1024,1504
//!
//! # Read a case's full description
//! mctp-bench describe defrag
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mctp-bench",
    about = "Cycle benchmarks for the MCTP-over-USB management stack",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered benchmark cases with short descriptions.
    List,

    /// Print the full description of one case.
    Describe {
        /// Case name, as shown by `list`.
        case: String,
    },

    /// Run one benchmark case and print its cycle report.
    Run {
        /// Case name, as shown by `list`.
        case: String,

        /// Measured repetitions (configured default when omitted).
        #[arg(short, long)]
        repetitions: Option<u32>,

        /// NC-SI frame size in bytes for the fragmentation cases.
        #[arg(short, long)]
        frame_size: Option<usize>,

        /// Emit the report as JSON instead of the summary line.
        #[arg(long)]
        json: bool,
    },

    /// Sweep cases across a set of frame sizes and print a table.
    Sweep {
        /// Comma-separated frame sizes in bytes (e.g., "64,256,1504").
        #[arg(long, default_value = "64,256,1024,1504")]
        sizes: String,

        /// Comma-separated cases to sweep.
        #[arg(long, default_value = "frag,defrag")]
        cases: String,

        /// Measured repetitions per size (configured default when omitted).
        #[arg(short, long)]
        repetitions: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List => commands::list::execute(config),
        Commands::Describe { case } => commands::describe::execute(config, &case),
        Commands::Run {
            case,
            repetitions,
            frame_size,
            json,
        } => commands::run::execute(config, &case, repetitions, frame_size, json),
        Commands::Sweep {
            sizes,
            cases,
            repetitions,
        } => commands::sweep::execute(config, &sizes, &cases, repetitions),
    }
}
