/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Main executable for leed-rs

use clap::Parser;
use leed_rs::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over -v
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level().as_str()),
    )
    .init();

    let output = cli::run(&args)?;
    print!("{}", output);
    if args.json {
        println!();
    }

    Ok(())
}
